use crate::adapters::line_reader::{LineReader, ProgressReader};
use crate::adapters::spool::{SpoolFile, SpoolRegistry};
use crate::adapters::stdio::{ScopedIo, copy_resource};
use crate::domain::{PipelineConfig, Resource, RunSummary};
use crate::error::{HashtreeError, Result};
use crate::ports::{DiscoveryPort, HashingPort, ProgressPort, SortPort};
use crate::services::DigestEngine;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveInput,
    PreSort,
    Digest,
    PostSort,
    Deliver,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolveInput => "resolve-input",
            Stage::PreSort => "pre-sort",
            Stage::Digest => "digest",
            Stage::PostSort => "post-sort",
            Stage::Deliver => "deliver",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

pub struct PipelineService<H, S, D, P> {
    hasher: H,
    sorter: S,
    discovery: D,
    progress: P,
    spools: SpoolRegistry,
}

impl<H, S, D, P> PipelineService<H, S, D, P>
where
    H: HashingPort,
    S: SortPort,
    D: DiscoveryPort,
    P: ProgressPort,
{
    pub fn new(hasher: H, sorter: S, discovery: D, progress: P) -> Self {
        Self {
            hasher,
            sorter,
            discovery,
            progress,
            spools: SpoolRegistry::new(),
        }
    }

    pub fn with_spools(mut self, spools: SpoolRegistry) -> Self {
        self.spools = spools;
        self
    }

    /// Runs one pass: resolve the file list, optionally sort it, digest every
    /// listed file, and optionally sort the output. Spool files created along
    /// the way are removed before this returns, on success or failure.
    pub fn run(&self, config: &PipelineConfig) -> Result<RunSummary> {
        config.validate()?;
        let mut spools = Vec::new();

        enter(Stage::ResolveInput);
        let input = self.resolve_input(config, &mut spools)?;

        if config.sort_files {
            enter(Stage::PreSort);
            self.sorter.sort(&input, &config.sort_args)?;
        }

        let spooled_output = if config.sort_output {
            Some(self.spool(config, &mut spools)?)
        } else {
            None
        };
        let digest_target = spooled_output.clone().unwrap_or_else(|| config.output.clone());

        enter(Stage::Digest);
        let records = self.digest(config, &input, &digest_target)?;

        if let Some(spooled) = spooled_output {
            enter(Stage::PostSort);
            self.sorter.sort(&spooled, &config.sort_args)?;

            enter(Stage::Deliver);
            copy_resource(&spooled, &config.output)?;
        }

        drop(spools);
        enter(Stage::Done);
        info!(records, algorithm = %config.algorithm, "digest complete");
        Ok(RunSummary {
            records,
            algorithm: config.algorithm,
        })
    }

    fn resolve_input(&self, config: &PipelineConfig, spools: &mut Vec<SpoolFile>) -> Result<Resource> {
        if config.find {
            let listing = match config.listing_path() {
                Some(path) => Resource::Path(path.to_path_buf()),
                None => self.spool(config, spools)?,
            };
            if let Some(path) = listing.path() {
                debug!(base = %config.base_dir.display(), listing = %path.display(), "discovering files");
                self.discovery.discover(&config.base_dir, path)?;
            }
            Ok(listing)
        } else if config.input.is_stdio() {
            let spooled = self.spool(config, spools)?;
            let copied = copy_resource(&Resource::Stdio, &spooled).map_err(HashtreeError::ListRead)?;
            debug!(bytes = copied, "spooled file list from stdin");
            Ok(spooled)
        } else {
            Ok(config.input.clone())
        }
    }

    fn spool(&self, config: &PipelineConfig, spools: &mut Vec<SpoolFile>) -> Result<Resource> {
        let spool = self.spools.create_in(&config.temp_dir)?;
        let resource = spool.resource();
        spools.push(spool);
        Ok(resource)
    }

    fn digest(&self, config: &PipelineConfig, input: &Resource, output: &Resource) -> Result<u64> {
        let engine = DigestEngine::new(&self.hasher, &config.base_dir, config.algorithm);
        let mut io = ScopedIo::open(input, output)?;
        let total = io.input.remaining_len();
        let lines = ProgressReader::new(LineReader::new(&mut io.input), total, &self.progress);

        let mut records = 0;
        for line in lines {
            let line = line.map_err(HashtreeError::ListRead)?;
            let record = engine.compute(&line)?;
            io.output.write_line(&record.to_string())?;
            records += 1;
        }

        io.finish()?;
        Ok(records)
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "entering stage");
}
