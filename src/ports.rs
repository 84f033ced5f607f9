use crate::domain::{HashAlgorithm, Resource, SortArgs};
use crate::error::Result;
use std::path::Path;

pub trait HashingPort {
    /// Lower-case hex digest of the whole file.
    fn hash_file(&self, path: &Path, algorithm: HashAlgorithm) -> Result<String>;
}

pub trait SortPort {
    /// Reorders the lines of `resource` in place.
    fn sort(&self, resource: &Resource, args: &SortArgs) -> Result<()>;
}

pub trait DiscoveryPort {
    /// Writes every regular file under `base_dir`, one per line, into `listing`.
    fn discover(&self, base_dir: &Path, listing: &Path) -> Result<()>;
}

pub trait ProgressPort {
    fn start(&self, total: Option<u64>);
    fn advance(&self, delta: u64);
    fn finish(&self);
}

impl<T: HashingPort + ?Sized> HashingPort for &T {
    fn hash_file(&self, path: &Path, algorithm: HashAlgorithm) -> Result<String> {
        (**self).hash_file(path, algorithm)
    }
}
