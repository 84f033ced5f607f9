use crate::domain::HashAlgorithm;
use crate::error::{HashtreeError, Result};
use crate::ports::HashingPort;
use blake3::Hasher as Blake3Hasher;
use digest::Digest;
use memmap2::MmapOptions;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 8192;

trait StreamingDigest {
    fn update(&mut self, data: &[u8]);
    fn finalize_hex(self: Box<Self>) -> String;
}

struct RustCrypto<D>(D);

impl<D: Digest> StreamingDigest for RustCrypto<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        let RustCrypto(inner) = *self;
        hex::encode(inner.finalize())
    }
}

impl StreamingDigest for md5::Context {
    fn update(&mut self, data: &[u8]) {
        self.consume(data);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        let context = *self;
        format!("{:x}", context.compute())
    }
}

impl StreamingDigest for Blake3Hasher {
    fn update(&mut self, data: &[u8]) {
        Blake3Hasher::update(self, data);
    }

    fn finalize_hex(self: Box<Self>) -> String {
        self.finalize().to_hex().to_string()
    }
}

fn digest_for(algorithm: HashAlgorithm) -> Box<dyn StreamingDigest> {
    match algorithm {
        HashAlgorithm::Md5 => Box::new(md5::Context::new()),
        HashAlgorithm::Sha1 => Box::new(RustCrypto(sha1::Sha1::new())),
        HashAlgorithm::Sha224 => Box::new(RustCrypto(sha2::Sha224::new())),
        HashAlgorithm::Sha256 => Box::new(RustCrypto(sha2::Sha256::new())),
        HashAlgorithm::Sha384 => Box::new(RustCrypto(sha2::Sha384::new())),
        HashAlgorithm::Sha512 => Box::new(RustCrypto(sha2::Sha512::new())),
        HashAlgorithm::Sha3_224 => Box::new(RustCrypto(sha3::Sha3_224::new())),
        HashAlgorithm::Sha3_256 => Box::new(RustCrypto(sha3::Sha3_256::new())),
        HashAlgorithm::Sha3_384 => Box::new(RustCrypto(sha3::Sha3_384::new())),
        HashAlgorithm::Sha3_512 => Box::new(RustCrypto(sha3::Sha3_512::new())),
        HashAlgorithm::Blake2b => Box::new(RustCrypto(blake2::Blake2b512::new())),
        HashAlgorithm::Blake2s => Box::new(RustCrypto(blake2::Blake2s256::new())),
        HashAlgorithm::Blake3 => Box::new(Blake3Hasher::new()),
    }
}

pub struct MultiAlgorithmHasher {
    mmap_threshold: u64,
}

impl Default for MultiAlgorithmHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiAlgorithmHasher {
    pub fn new() -> Self {
        Self {
            mmap_threshold: 64 * 1024 * 1024,
        }
    }

    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    fn hash_with_mmap(&self, file: &File, algorithm: HashAlgorithm) -> io::Result<String> {
        let mmap = unsafe { MmapOptions::new().map(file)? };
        let mut hasher = digest_for(algorithm);
        hasher.update(&mmap[..]);
        Ok(hasher.finalize_hex())
    }

    fn hash_with_buffered_io(&self, file: File, algorithm: HashAlgorithm) -> io::Result<String> {
        let mut reader = BufReader::new(file);
        let mut buffer = [0; BUFFER_SIZE];
        let mut hasher = digest_for(algorithm);

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.finalize_hex())
    }

    fn hash_path(&self, path: &Path, algorithm: HashAlgorithm) -> io::Result<String> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        // Zero-length files cannot be mapped.
        if file_size > 0 && file_size >= self.mmap_threshold {
            self.hash_with_mmap(&file, algorithm)
        } else {
            self.hash_with_buffered_io(file, algorithm)
        }
    }
}

impl HashingPort for MultiAlgorithmHasher {
    fn hash_file(&self, path: &Path, algorithm: HashAlgorithm) -> Result<String> {
        let hex_digest = self.hash_path(path, algorithm).map_err(|source| HashtreeError::Digest {
            path: path.to_path_buf(),
            source,
        })?;
        debug_assert_eq!(hex_digest.len(), algorithm.output_len() * 2);
        Ok(hex_digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn known_vectors() {
        let dir = TempDir::new().unwrap();
        let empty = write(&dir, "empty", b"");
        let abc = write(&dir, "abc", b"abc");
        let hasher = MultiAlgorithmHasher::new();

        assert_eq!(hasher.hash_file(&empty, HashAlgorithm::Sha256).unwrap(), EMPTY_SHA256);
        assert_eq!(
            hasher.hash_file(&empty, HashAlgorithm::Md5).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            hasher.hash_file(&empty, HashAlgorithm::Sha1).unwrap(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            hasher.hash_file(&empty, HashAlgorithm::Sha3_256).unwrap(),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
        assert_eq!(
            hasher.hash_file(&empty, HashAlgorithm::Blake3).unwrap(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
        assert_eq!(
            hasher.hash_file(&abc, HashAlgorithm::Sha256).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn every_algorithm_is_deterministic_and_full_length() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data", &vec![7u8; 3 * BUFFER_SIZE + 11]);
        let hasher = MultiAlgorithmHasher::new();

        for algorithm in HashAlgorithm::ALL {
            let first = hasher.hash_file(&path, algorithm).unwrap();
            let second = hasher.hash_file(&path, algorithm).unwrap();
            assert_eq!(first, second, "{algorithm}");
            assert_eq!(first.len(), algorithm.output_len() * 2, "{algorithm}");
            assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn mmap_and_buffered_paths_agree() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data", b"the quick brown fox\n");
        let buffered = MultiAlgorithmHasher::new();
        let mapped = MultiAlgorithmHasher::new().with_mmap_threshold(1);

        for algorithm in HashAlgorithm::ALL {
            assert_eq!(
                buffered.hash_file(&path, algorithm).unwrap(),
                mapped.hash_file(&path, algorithm).unwrap()
            );
        }

        let empty = write(&dir, "empty", b"");
        assert_eq!(mapped.hash_file(&empty, HashAlgorithm::Sha256).unwrap(), EMPTY_SHA256);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = MultiAlgorithmHasher::new()
            .hash_file(&missing, HashAlgorithm::Sha256)
            .unwrap_err();
        match err {
            HashtreeError::Digest { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
