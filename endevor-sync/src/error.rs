//! Error types for endevor-sync.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// All errors that can arise while obtaining a sync response.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The response JSON is malformed or carries a status outside the
    /// known enumeration.
    #[error("invalid sync response: {0}")]
    Parse(#[source] serde_json::Error),
}

/// The raced operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {}s", .0.as_secs())]
pub struct TimeoutError(pub Duration);

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
