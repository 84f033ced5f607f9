use crate::domain::ProgressOptions;
use crate::ports::ProgressPort;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const UNICODE_BAR: &str = "█▉▊▋▌▍▎▏ ";
const ASCII_BAR: &str = "#>-";
const ASCII_TICKS: &str = "|/-\\ ";

pub struct ProgressBarAdapter {
    bar: ProgressBar,
    options: ProgressOptions,
    quiet: bool,
}

impl ProgressBarAdapter {
    pub fn new(options: ProgressOptions) -> Self {
        let ascii = options.ascii || !Term::stderr().features().wants_emoji();
        Self {
            bar: ProgressBar::hidden(),
            options: ProgressOptions { ascii, ..options },
            quiet: false,
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            options: ProgressOptions::default(),
            quiet: true,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn bar_segment(&self) -> String {
        match self.options.width {
            Some(width) => format!("{{bar:{width}}}"),
            None => "{wide_bar}".to_string(),
        }
    }

    fn style(&self, total: Option<u64>) -> ProgressStyle {
        let template = match total {
            Some(_) => format!(
                "{{spinner}} [{{elapsed_precise}}] {} {{bytes}}/{{total_bytes}} ({{eta}})",
                self.bar_segment()
            ),
            None => "{spinner} [{elapsed_precise}] {pos} lines ({per_sec})".to_string(),
        };
        let style = ProgressStyle::with_template(&template).unwrap_or_else(|_| ProgressStyle::default_bar());
        if self.options.ascii {
            style.progress_chars(ASCII_BAR).tick_chars(ASCII_TICKS)
        } else {
            style.progress_chars(UNICODE_BAR)
        }
    }
}

impl ProgressPort for ProgressBarAdapter {
    fn start(&self, total: Option<u64>) {
        if self.quiet {
            return;
        }

        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        // Line mode never renders the length, so a stale one is harmless.
        if let Some(len) = total {
            self.bar.set_length(len);
        }
        self.bar.set_position(0);
        self.bar.set_style(self.style(total));
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn advance(&self, delta: u64) {
        if self.quiet {
            return;
        }

        self.bar.inc(delta);
    }

    fn finish(&self) {
        if self.quiet {
            return;
        }

        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_adapter_ignores_updates() {
        let progress = ProgressBarAdapter::new_quiet();
        progress.start(Some(10));
        progress.advance(4);
        progress.finish();
        assert_eq!(progress.bar.position(), 0);
    }

    #[test]
    fn fixed_width_replaces_wide_bar() {
        let progress = ProgressBarAdapter::new(ProgressOptions {
            ascii: true,
            width: Some(30),
        });
        assert_eq!(progress.bar_segment(), "{bar:30}");
        assert!(progress.options.ascii);

        let wide = ProgressBarAdapter::new(ProgressOptions::default());
        assert_eq!(wide.bar_segment(), "{wide_bar}");
    }

    #[test]
    fn position_tracks_advances() {
        let progress = ProgressBarAdapter::new(ProgressOptions::default());
        progress.start(Some(100));
        progress.advance(40);
        progress.advance(2);
        assert_eq!(progress.bar.position(), 42);
        assert_eq!(progress.bar.length(), Some(100));
        progress.finish();
    }
}
