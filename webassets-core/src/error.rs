//! Error types for webassets-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from source and mapping operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A declared source locator could not be opened.
    #[error("resource not found: {name}")]
    MissingResource { name: String },

    /// A mapping target escaped the destination root.
    #[error("mapping target must be relative, got {path}")]
    AbsoluteTarget { path: PathBuf },
}

/// Convenience constructor for [`CoreError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
