//! # webassets-core
//!
//! Domain types shared by the webassets engine: module names, source
//! locators, path mappings, and content fingerprint stamps.

pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{FileStamp, ModuleName, PathMapping, Source};
