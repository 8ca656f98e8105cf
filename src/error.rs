//! Error types for scanning and scraping processes.

use std::path::PathBuf;

/// Failure to build one process snapshot. Callers skip the process.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid process id: {0}")]
    InvalidPid(String),

    #[error("no user entry for uid {0}")]
    UnknownOwner(u32),

    #[error("user lookup for uid {uid} failed: {message}")]
    OwnerLookup { uid: u32, message: String },
}

impl ScrapeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure to enumerate the process root itself.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot read process root {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
