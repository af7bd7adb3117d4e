//! # webassets-webjars
//!
//! Bulk extraction of bundled third-party asset modules ("WebJars") into a
//! conventional `<lib>/<module>/...` layout, built on the webassets-sync
//! directory synchronizer so re-running with an unchanged module set is a
//! no-op.

pub mod error;
pub mod extract;
pub mod filter;
pub mod namespace;

pub use error::WebJarError;
pub use extract::{extract, ExtractOptions, ExtractReport};
pub use filter::NameFilter;
pub use namespace::{DirNamespace, MemoryNamespace, ResourceNamespace};
