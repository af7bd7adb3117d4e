//! Error types for webassets-sync.

use std::path::PathBuf;

use thiserror::Error;

use webassets_core::CoreError;

/// All errors that can arise from incremental sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from source/mapping handling.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (cache/manifest save path).
    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The work function dropped an identity it was asked to process.
    #[error("no result reported for input '{identity}'")]
    MissingWorkResult { identity: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
