use std::path::PathBuf;
use thiserror::Error;

/// Why a node was reported without being analyzed.
///
/// The `Display` text is the reason string handed to report sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SkipReason {
    #[error("cannot find path")]
    NotFound,

    #[error("cannot open path")]
    CannotOpen,

    #[error("not a file")]
    NotAFile,

    #[error("ignored unsupported file type")]
    Unsupported,

    #[error("cannot read file")]
    ReadFile,

    #[error("cannot read folder")]
    ReadFolder,

    /// A directory reached again through a symlink
    #[error("folder already visited")]
    Revisited,

    #[error("analysis engine failed")]
    EngineFailed,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse options file {}: {message}", path.display())]
    OptionsParse { path: PathBuf, message: String },

    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
