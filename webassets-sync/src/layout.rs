//! Per-run cache layout context.
//!
//! One cache file exists per (operation kind, target directory) pair.
//! `CacheLayout` is created explicitly once per build invocation and passed
//! to whatever needs namespaced cache files; there is no process-global
//! state. `open()` creates the cache root, `close()` ends the lifecycle.

use std::path::{Path, PathBuf};

use webassets_core::types::sha256_hex;

use crate::error::{io_err, SyncError};

/// Explicitly passed cache-directory context.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Open a cache layout rooted at `root`, creating the directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<CacheLayout, SyncError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
        Ok(CacheLayout { root })
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache file for one (operation kind, target directory) pair:
    /// `<root>/<kind>-<first 12 hex of sha256(target)>.json`.
    ///
    /// Distinct targets get distinct files, so operations against different
    /// directories never contend for the same cache.
    pub fn cache_path(&self, kind: &str, target: &Path) -> PathBuf {
        let digest = sha256_hex(target.to_string_lossy().as_bytes());
        self.root.join(format!("{kind}-{}.json", &digest[..12]))
    }

    /// End of lifecycle. All documents are persisted eagerly by their
    /// owners, so there is nothing to flush.
    pub fn close(self) {}
}
