use crate::domain::Resource;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

const SPOOL_PREFIX: &str = "hashtree_file_list";

/// Tracks spool files that are still on disk so a signal handler can
/// remove them if the process is interrupted.
#[derive(Debug, Clone, Default)]
pub struct SpoolRegistry {
    live: Arc<Mutex<Vec<PathBuf>>>,
}

impl SpoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_in(&self, dir: &Path) -> io::Result<SpoolFile> {
        let path = Builder::new()
            .prefix(SPOOL_PREFIX)
            .tempfile_in(dir)?
            .into_temp_path();
        debug!(spool = %path.display(), "created spool file");
        let tracked = self.track(&path);
        Ok(SpoolFile { path, tracked })
    }

    /// Registers a temporary file owned elsewhere. The registry forgets it
    /// when the returned guard drops; deleting it stays with the owner.
    pub fn track(&self, path: &Path) -> Tracked {
        self.lock().push(path.to_path_buf());
        Tracked {
            path: path.to_path_buf(),
            registry: self.clone(),
        }
    }

    pub fn live(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    /// Removes every spool still registered. Files that are already gone
    /// count as removed.
    pub fn reap_all(&self) {
        for path in self.lock().drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(spool = %path.display(), error = %e, "cannot remove spool file"),
            }
        }
    }

    fn forget(&self, path: &Path) {
        self.lock().retain(|live| live != path);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PathBuf>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a path in its registry until dropped.
#[derive(Debug)]
pub struct Tracked {
    path: PathBuf,
    registry: SpoolRegistry,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.registry.forget(&self.path);
    }
}

/// A temporary named file, deleted when dropped.
#[derive(Debug)]
pub struct SpoolFile {
    path: TempPath,
    tracked: Tracked,
}

impl SpoolFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resource(&self) -> Resource {
        Resource::Path(self.path.to_path_buf())
    }
}

impl Drop for SpoolFile {
    fn drop(&mut self) {
        debug!(spool = %self.tracked.path.display(), "releasing spool file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn spool_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let registry = SpoolRegistry::new();
        let spool = registry.create_in(dir.path()).unwrap();
        let path = spool.path().to_path_buf();

        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with(SPOOL_PREFIX));
        assert_eq!(registry.live(), vec![path.clone()]);

        drop(spool);
        assert!(!path.exists());
        assert!(registry.live().is_empty());
    }

    #[test]
    fn already_deleted_spool_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let registry = SpoolRegistry::new();
        let spool = registry.create_in(dir.path()).unwrap();
        fs::remove_file(spool.path()).unwrap();
        drop(spool);
        assert!(registry.live().is_empty());
    }

    #[test]
    fn tracked_paths_are_reaped_but_not_owned() {
        let dir = TempDir::new().unwrap();
        let registry = SpoolRegistry::new();
        let kept = dir.path().join("kept");
        let reaped = dir.path().join("reaped");
        fs::write(&kept, "").unwrap();
        fs::write(&reaped, "").unwrap();

        drop(registry.track(&kept));
        assert!(kept.exists());
        assert!(registry.live().is_empty());

        let _guard = registry.track(&reaped);
        assert_eq!(registry.live(), vec![reaped.clone()]);
        registry.reap_all();
        assert!(!reaped.exists());
    }

    #[test]
    fn reap_all_clears_live_spools() {
        let dir = TempDir::new().unwrap();
        let registry = SpoolRegistry::new();
        let first = registry.create_in(dir.path()).unwrap();
        let second = registry.create_in(dir.path()).unwrap();
        fs::remove_file(second.path()).unwrap();

        registry.reap_all();
        assert!(!first.path().exists());
        assert!(registry.live().is_empty());
    }
}
