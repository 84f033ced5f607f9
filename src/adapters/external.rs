use crate::adapters::spool::SpoolRegistry;
use crate::domain::{Resource, SortArgs};
use crate::error::{HashtreeError, Result};
use crate::ports::{DiscoveryPort, SortPort};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Runs `command` to completion, treating a nonzero exit as fatal.
fn run_checked(mut command: Command) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!(command = ?command, "running external command");
    let status = command
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| HashtreeError::Spawn {
            program: program.clone(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(HashtreeError::ExternalProcess { program, status })
    }
}

/// Sorts files in place with the system `sort` utility.
pub struct SystemSort {
    program: String,
    spools: SpoolRegistry,
}

impl Default for SystemSort {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSort {
    pub fn new() -> Self {
        Self {
            program: "sort".to_string(),
            spools: SpoolRegistry::new(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Registers the sibling temp file of each sort so an interrupt
    /// mid-sort can remove it.
    pub fn with_spools(mut self, spools: SpoolRegistry) -> Self {
        self.spools = spools;
        self
    }

    fn sort_path(&self, path: &Path, args: &SortArgs) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let sorted = NamedTempFile::new_in(dir)?;
        let _tracked = self.spools.track(sorted.path());

        let mut command = Command::new(&self.program);
        command
            .args(args.as_slice())
            .stdin(File::open(path)?)
            .stdout(sorted.as_file().try_clone()?);
        run_checked(command)?;

        let permissions = fs::metadata(path)?.permissions();
        fs::set_permissions(sorted.path(), permissions)?;
        replace(sorted, path)
    }
}

/// Moves `sorted` over `target`.
fn replace(sorted: NamedTempFile, target: &Path) -> Result<()> {
    match sorted.persist(target) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == io::ErrorKind::CrossesDevices => copy_over(e.file.path(), target),
        Err(e) => Err(e.error.into()),
    }
}

/// Fallback for a sibling temp file that still lands on another device,
/// as happens under overlay or bind mounts. Not atomic; the caller drops
/// `source` afterwards.
fn copy_over(source: &Path, target: &Path) -> Result<()> {
    warn!(target = %target.display(), "rename crosses devices, copying sorted output instead");
    fs::copy(source, target)?;
    Ok(())
}

impl SortPort for SystemSort {
    fn sort(&self, resource: &Resource, args: &SortArgs) -> Result<()> {
        match resource {
            Resource::Stdio => Err(HashtreeError::CannotSortStdio),
            Resource::Path(path) => {
                debug!(path = %path.display(), args = ?args.as_slice(), "sorting in place");
                self.sort_path(path, args)
            }
        }
    }
}

/// Lists regular files with the system `find` utility.
pub struct FindDiscovery {
    program: String,
}

impl Default for FindDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl FindDiscovery {
    pub fn new() -> Self {
        Self {
            program: "find".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl DiscoveryPort for FindDiscovery {
    fn discover(&self, base_dir: &Path, listing: &Path) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .args([".", "-type", "f"])
            .current_dir(base_dir)
            .stdin(Stdio::null())
            .stdout(File::create(listing)?);
        run_checked(command)
    }
}
