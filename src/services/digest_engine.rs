use crate::domain::{DigestRecord, HashAlgorithm};
use crate::error::Result;
use crate::ports::HashingPort;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Turns one listed path into a digest record for a fixed base directory
/// and algorithm.
pub struct DigestEngine<H> {
    hasher: H,
    base_dir: PathBuf,
    base_prefix: String,
    algorithm: HashAlgorithm,
}

impl<H: HashingPort> DigestEngine<H> {
    pub fn new(hasher: H, base_dir: impl Into<PathBuf>, algorithm: HashAlgorithm) -> Self {
        let base_dir = base_dir.into();
        let base_prefix = base_dir.to_string_lossy().into_owned();
        Self {
            hasher,
            base_dir,
            base_prefix,
            algorithm,
        }
    }

    /// Like [`DigestEngine::new`], resolving the algorithm by name.
    pub fn configure(hasher: H, base_dir: impl Into<PathBuf>, algorithm: &str) -> Result<Self> {
        Ok(Self::new(hasher, base_dir, algorithm.parse()?))
    }

    /// Strips the base directory from paths that textually start with it.
    /// Paths that share only a string prefix are left alone.
    pub fn normalize<'a>(&self, listed: &'a str) -> Cow<'a, str> {
        if listed.starts_with(&self.base_prefix) {
            if let Ok(relative) = Path::new(listed).strip_prefix(&self.base_dir) {
                return Cow::Owned(relative.to_string_lossy().into_owned());
            }
        }
        Cow::Borrowed(listed)
    }

    pub fn compute(&self, listed: &str) -> Result<DigestRecord> {
        let relative = self.normalize(listed);
        let hex_digest = self
            .hasher
            .hash_file(&self.base_dir.join(&*relative), self.algorithm)?;
        Ok(DigestRecord::new(self.algorithm, relative, hex_digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MultiAlgorithmHasher;
    use crate::error::HashtreeError;
    use std::fs;
    use tempfile::TempDir;

    fn engine(base: &str) -> DigestEngine<MultiAlgorithmHasher> {
        DigestEngine::new(MultiAlgorithmHasher::new(), base, HashAlgorithm::Sha256)
    }

    #[test]
    fn strips_matching_base_prefix() {
        assert_eq!(engine(".").normalize("./a.txt"), "a.txt");
        assert_eq!(engine(".").normalize("./sub/b.txt"), "sub/b.txt");
        assert_eq!(engine("/srv/data").normalize("/srv/data/x/y"), "x/y");
    }

    #[test]
    fn leaves_other_paths_untouched() {
        assert_eq!(engine(".").normalize("a.txt"), "a.txt");
        assert_eq!(engine(".").normalize(".hidden"), ".hidden");
        assert_eq!(engine("/srv/data").normalize("/srv/database/x"), "/srv/database/x");
        assert_eq!(engine("/srv/data").normalize("./x"), "./x");
    }

    #[test]
    fn computes_relative_to_base() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        let engine = DigestEngine::configure(MultiAlgorithmHasher::new(), dir.path(), "SHA256").unwrap();

        let plain = engine.compute("a.txt").unwrap();
        assert_eq!(
            plain.to_string(),
            "SHA256 (a.txt) = e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        let absolute = dir.path().join("a.txt");
        let prefixed = engine.compute(&absolute.to_string_lossy()).unwrap();
        assert_eq!(prefixed, plain);
    }

    #[test]
    fn unknown_algorithm_is_rejected_up_front() {
        let result = DigestEngine::configure(MultiAlgorithmHasher::new(), ".", "shake_256");
        assert!(matches!(result, Err(HashtreeError::UnknownAlgorithm(_))));
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let engine = DigestEngine::new(MultiAlgorithmHasher::new(), dir.path(), HashAlgorithm::Md5);
        assert!(matches!(
            engine.compute("absent.txt"),
            Err(HashtreeError::Digest { .. })
        ));
    }
}
