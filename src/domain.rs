use crate::error::{HashtreeError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_SORT_ARGS: &str = "-ifdk1.1";
pub const STDIO_PLACEHOLDER: &str = "-";

/// Fixed-length digests available for whole-file checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b,
    Blake2s,
    Blake3,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 13] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
        HashAlgorithm::Sha3_224,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Sha3_384,
        HashAlgorithm::Sha3_512,
        HashAlgorithm::Blake2b,
        HashAlgorithm::Blake2s,
        HashAlgorithm::Blake3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha3_224 => "sha3_224",
            HashAlgorithm::Sha3_256 => "sha3_256",
            HashAlgorithm::Sha3_384 => "sha3_384",
            HashAlgorithm::Sha3_512 => "sha3_512",
            HashAlgorithm::Blake2b => "blake2b",
            HashAlgorithm::Blake2s => "blake2s",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Name as it appears at the start of every output line.
    pub fn label(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 | HashAlgorithm::Sha3_224 => 28,
            HashAlgorithm::Sha256 | HashAlgorithm::Sha3_256 => 32,
            HashAlgorithm::Sha384 | HashAlgorithm::Sha3_384 => 48,
            HashAlgorithm::Sha512 | HashAlgorithm::Sha3_512 => 64,
            HashAlgorithm::Blake2b => 64,
            HashAlgorithm::Blake2s | HashAlgorithm::Blake3 => 32,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashtreeError;

    fn from_str(name: &str) -> Result<Self> {
        HashAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| HashtreeError::UnknownAlgorithm(name.to_string()))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered checksum line: `ALGORITHM (path) = hex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRecord {
    pub algorithm: HashAlgorithm,
    pub path: String,
    pub hex_digest: String,
}

impl DigestRecord {
    pub fn new(algorithm: HashAlgorithm, path: impl Into<String>, hex_digest: String) -> Self {
        Self {
            algorithm,
            path: path.into(),
            hex_digest,
        }
    }
}

impl fmt::Display for DigestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) = {}", self.algorithm.label(), self.path, self.hex_digest)
    }
}

/// Either a standard stream (`-`) or a named file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resource {
    #[default]
    Stdio,
    Path(PathBuf),
}

impl Resource {
    pub fn is_stdio(&self) -> bool {
        matches!(self, Resource::Stdio)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Resource::Stdio => None,
            Resource::Path(path) => Some(path),
        }
    }
}

impl From<&str> for Resource {
    fn from(value: &str) -> Self {
        if value == STDIO_PLACEHOLDER {
            Resource::Stdio
        } else {
            Resource::Path(PathBuf::from(value))
        }
    }
}

impl From<PathBuf> for Resource {
    fn from(value: PathBuf) -> Self {
        if value.as_os_str() == STDIO_PLACEHOLDER {
            Resource::Stdio
        } else {
            Resource::Path(value)
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Stdio => f.write_str(STDIO_PLACEHOLDER),
            Resource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Arguments handed to the external `sort` utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortArgs(Vec<String>);

impl SortArgs {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for SortArgs {
    fn default() -> Self {
        Self(vec![DEFAULT_SORT_ARGS.to_string()])
    }
}

impl FromStr for SortArgs {
    type Err = HashtreeError;

    fn from_str(args: &str) -> Result<Self> {
        shlex::split(args)
            .map(SortArgs)
            .ok_or_else(|| HashtreeError::Config(format!("unbalanced quoting in sort arguments: {args}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub consumed: u64,
    pub total: Option<u64>,
}

impl ProgressState {
    pub fn new(total: Option<u64>) -> Self {
        Self { consumed: 0, total }
    }

    /// Bytes when the total is known, otherwise one unit per line.
    pub fn advance(&mut self, line_bytes: u64) -> u64 {
        let delta = if self.total.is_some() { line_bytes } else { 1 };
        self.consumed += delta;
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressOptions {
    pub ascii: bool,
    pub width: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_dir: PathBuf,
    pub input: Resource,
    pub output: Resource,
    pub algorithm: HashAlgorithm,
    pub find: bool,
    pub sort_files: bool,
    pub sort_output: bool,
    pub sort_args: SortArgs,
    pub progress: Option<bool>,
    pub progress_options: ProgressOptions,
    pub temp_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            input: Resource::Stdio,
            output: Resource::Stdio,
            algorithm: HashAlgorithm::default(),
            find: true,
            sort_files: true,
            sort_output: false,
            sort_args: SortArgs::default(),
            progress: None,
            progress_options: ProgressOptions::default(),
            temp_dir: PathBuf::from("."),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_input(mut self, input: Resource) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: Resource) -> Self {
        self.output = output;
        self
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_find(mut self, find: bool) -> Self {
        self.find = find;
        self
    }

    pub fn with_sort_files(mut self, sort_files: bool) -> Self {
        self.sort_files = sort_files;
        self
    }

    pub fn with_sort_output(mut self, sort_output: bool) -> Self {
        self.sort_output = sort_output;
        self
    }

    pub fn with_sort_args(mut self, sort_args: SortArgs) -> Self {
        self.sort_args = sort_args;
        self
    }

    pub fn with_progress(mut self, progress: Option<bool>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Progress stays off for piped stdout unless forced on.
    pub fn progress_enabled(&self, stderr_is_term: bool) -> bool {
        match self.progress {
            Some(forced) => forced,
            None => !self.output.is_stdio() && stderr_is_term,
        }
    }

    /// Named file that receives the discovered listing. `-` and `.` mean
    /// the listing goes to a spool file instead.
    pub fn listing_path(&self) -> Option<&Path> {
        self.input.path().filter(|path| *path != Path::new("."))
    }

    pub fn validate(&self) -> Result<()> {
        require_dir("base directory", &self.base_dir)?;
        require_dir("temp directory", &self.temp_dir)?;
        let input = if self.find { self.listing_path() } else { self.input.path() };
        for (role, path) in [("INFILE", input), ("OUTFILE", self.output.path())] {
            if let Some(path) = path.filter(|path| path.is_dir()) {
                return Err(HashtreeError::Config(format!(
                    "{role} '{}' is a directory",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn require_dir(role: &str, path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(HashtreeError::Config(format!(
            "{role} '{}' does not exist or is not a directory",
            path.display()
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub algorithm: HashAlgorithm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_are_case_insensitive() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("Sha3_512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha3_512);
        assert!(matches!(
            "shake_128".parse::<HashAlgorithm>(),
            Err(HashtreeError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn record_renders_upper_case_label() {
        let record = DigestRecord::new(HashAlgorithm::Sha3_256, "dir/a.txt", "00ff".to_string());
        assert_eq!(record.to_string(), "SHA3_256 (dir/a.txt) = 00ff");
    }

    #[test]
    fn dash_is_the_stdio_placeholder() {
        assert_eq!(Resource::from("-"), Resource::Stdio);
        assert_eq!(Resource::from(PathBuf::from("-")), Resource::Stdio);
        assert_eq!(Resource::from("list.txt"), Resource::Path(PathBuf::from("list.txt")));
        assert_eq!(Resource::Stdio.to_string(), "-");
    }

    #[test]
    fn sort_args_split_like_a_shell() {
        let args: SortArgs = "-k2 -t ' '".parse().unwrap();
        assert_eq!(args.as_slice(), ["-k2", "-t", " "]);
        assert_eq!(SortArgs::default().as_slice(), [DEFAULT_SORT_ARGS]);
        assert!(matches!("-k 'open".parse::<SortArgs>(), Err(HashtreeError::Config(_))));
    }

    #[test]
    fn progress_state_counts_bytes_or_lines() {
        let mut bytes = ProgressState::new(Some(10));
        assert_eq!(bytes.advance(6), 6);
        assert_eq!(bytes.consumed, 6);

        let mut lines = ProgressState::new(None);
        lines.advance(6);
        lines.advance(3);
        assert_eq!(lines.consumed, 2);
    }

    #[test]
    fn progress_defaults_off_for_stdout() {
        let piped = PipelineConfig::new();
        assert!(!piped.progress_enabled(true));
        assert!(piped.clone().with_progress(Some(true)).progress_enabled(false));

        let to_file = PipelineConfig::new().with_output(Resource::from("sums"));
        assert!(to_file.progress_enabled(true));
        assert!(!to_file.progress_enabled(false));
    }

    #[test]
    fn dot_input_spools_the_discovered_listing() {
        let config = PipelineConfig::new().with_input(Resource::from("."));
        assert_eq!(config.listing_path(), None);
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.with_find(false).validate(),
            Err(HashtreeError::Config(_))
        ));
        let named = PipelineConfig::new().with_input(Resource::from("files"));
        assert_eq!(named.listing_path(), Some(Path::new("files")));
    }

    #[test]
    fn validate_rejects_missing_base_dir() {
        let config = PipelineConfig::new().with_base_dir("/definitely/not/here");
        assert!(matches!(config.validate(), Err(HashtreeError::Config(_))));
    }
}
