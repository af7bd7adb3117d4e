//! Error types for webassets-webjars.

use std::path::PathBuf;

use thiserror::Error;

use webassets_core::CoreError;
use webassets_sync::SyncError;

/// All errors that can arise from module enumeration and extraction.
#[derive(Debug, Error)]
pub enum WebJarError {
    /// An error from the sync engine.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

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

    /// A namespace entry was requested that the namespace does not contain.
    #[error("no entry '{entry}' in module '{module}'")]
    NoSuchEntry { module: String, entry: PathBuf },
}

/// Convenience constructor for [`WebJarError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WebJarError {
    WebJarError::Io {
        path: path.into(),
        source,
    }
}
