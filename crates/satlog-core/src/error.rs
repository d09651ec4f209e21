//! Pipeline error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering, reading, or reporting on log files.
///
/// `FileRead` and `ReadInterrupted` are recoverable: the pipeline logs them
/// and moves on to the next file. The others abort the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read log file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read log file {} after line {line_number}: {source}", path.display())]
    ReadInterrupted {
        path: PathBuf,
        /// Last line read successfully; 0 if the first read failed.
        line_number: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("no log files matching `{pattern}` found in {}", dir.display())]
    NoLogFilesFound { dir: PathBuf, pattern: String },

    #[error("invalid log file pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to write report to {}: {source}", path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Whether the pipeline may log this error and continue with other files.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::FileRead { .. } | Self::ReadInterrupted { .. })
    }
}
