use crate::domain::ProgressState;
use crate::ports::ProgressPort;
use std::io::{self, Read};

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Splits a byte source into newline-terminated lines without holding
/// more than one chunk plus one partial line in memory.
pub struct LineReader<R> {
    source: R,
    chunk: Box<[u8]>,
    buffer: Vec<u8>,
    start: usize,
    scanned: usize,
    consumed: u64,
    done: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, CHUNK_SIZE)
    }

    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        Self {
            source,
            chunk: vec![0; chunk_size.max(1)].into_boxed_slice(),
            buffer: Vec::new(),
            start: 0,
            scanned: 0,
            consumed: 0,
            done: false,
        }
    }

    /// Raw bytes handed out so far, delimiters included.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    fn take_line(&mut self, end: usize, delimited: bool) -> io::Result<String> {
        let raw_end = if delimited { end + 1 } else { end };
        self.consumed += (raw_end - self.start) as u64;

        let mut line = &self.buffer[self.start..end];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        let text = std::str::from_utf8(line)
            .map(str::to_owned)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));

        self.start = raw_end;
        self.scanned = raw_end;
        text
    }

    fn fill(&mut self) -> io::Result<usize> {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        loop {
            match self.source.read(&mut self.chunk) {
                Ok(n) => {
                    self.buffer.extend_from_slice(&self.chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
                let end = self.scanned + offset;
                return Some(self.take_line(end, true));
            }
            self.scanned = self.buffer.len();

            match self.fill() {
                Ok(0) => {
                    self.done = true;
                    if self.start == self.buffer.len() {
                        return None;
                    }
                    let end = self.buffer.len();
                    return Some(self.take_line(end, false));
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Reports line consumption to a progress display. The display is
/// started on construction and finished on drop.
pub struct ProgressReader<'p, R, P: ProgressPort> {
    lines: LineReader<R>,
    progress: &'p P,
    state: ProgressState,
}

impl<'p, R: Read, P: ProgressPort> ProgressReader<'p, R, P> {
    pub fn new(lines: LineReader<R>, total: Option<u64>, progress: &'p P) -> Self {
        progress.start(total);
        Self {
            lines,
            progress,
            state: ProgressState::new(total),
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }
}

impl<R: Read, P: ProgressPort> Iterator for ProgressReader<'_, R, P> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let before = self.lines.consumed();
        let line = self.lines.next()?;
        if line.is_ok() {
            let delta = self.state.advance(self.lines.consumed() - before);
            self.progress.advance(delta);
        }
        Some(line)
    }
}

impl<R, P: ProgressPort> Drop for ProgressReader<'_, R, P> {
    fn drop(&mut self) {
        self.progress.finish();
    }
}
