use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HashtreeError>;

#[derive(Debug, Error)]
pub enum HashtreeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown hash algorithm '{0}'")]
    UnknownAlgorithm(String),

    /// Standard streams are never sortable in place.
    #[error("cannot sort stdio")]
    CannotSortStdio,

    #[error("cannot digest '{}': {source}", .path.display())]
    Digest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read file list: {0}")]
    ListRead(#[source] io::Error),

    #[error("cannot run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' failed with {status}")]
    ExternalProcess { program: String, status: ExitStatus },

    #[error(transparent)]
    Io(#[from] io::Error),
}
