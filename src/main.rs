use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use hashtree::adapters::{
    FindDiscovery, MultiAlgorithmHasher, ProgressBarAdapter, SpoolRegistry, SystemSort,
};
use hashtree::cli::Cli;
use hashtree::services::PipelineService;
use std::process;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let args = Cli::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Cli) -> Result<()> {
    init_logging(if args.debug { "debug" } else { "warn" })?;

    let config = args.to_pipeline_config()?;
    let spools = SpoolRegistry::new();
    install_signal_cleanup(spools.clone())?;

    let show_progress = config.progress_enabled(Term::stderr().is_term());
    let progress = ProgressBarAdapter::new(config.progress_options).with_quiet(!show_progress);

    let pipeline = PipelineService::new(
        MultiAlgorithmHasher::new(),
        SystemSort::new().with_spools(spools.clone()),
        FindDiscovery::new(),
        progress,
    )
    .with_spools(spools);

    pipeline.run(&config).context("hashtree failed")?;
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Spool files would otherwise outlive a run stopped by SIGINT, SIGTERM
/// or SIGHUP.
fn install_signal_cleanup(spools: SpoolRegistry) -> Result<()> {
    ctrlc::set_handler(move || {
        warn!(spools = spools.live().len(), "interrupted, removing spool files");
        spools.reap_all();
        process::exit(130);
    })
    .context("cannot install signal handler")
}
