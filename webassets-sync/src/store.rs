//! Persisted fingerprint store and sync manifest.
//!
//! Both documents are JSON files replaced atomically on save (`.tmp` +
//! rename), so a crashed writer never leaves a half-written file behind.
//! Loading is fail-open: a missing, unreadable, or corrupt file yields an
//! empty document and at most a warning — staleness costs redundant work,
//! never incorrect output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use webassets_core::FileStamp;

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Fingerprint of one completed unit of work: the files it read and the
/// files it wrote, each with the stamp recorded at completion time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(default)]
    pub reads: BTreeMap<PathBuf, FileStamp>,
    #[serde(default)]
    pub writes: BTreeMap<PathBuf, FileStamp>,
}

impl Fingerprint {
    /// True while every recorded read and write still matches the
    /// filesystem (length + mtime). Any discrepancy, including a deleted
    /// output, marks the fingerprint stale.
    pub fn is_current(&self) -> bool {
        self.reads.iter().chain(self.writes.iter()).all(|(path, stamp)| stamp.matches_disk(path))
    }

    /// The output files this unit of work produced.
    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.writes.keys()
    }
}

// ---------------------------------------------------------------------------
// FingerprintStore
// ---------------------------------------------------------------------------

/// Persisted mapping from input identity to [`Fingerprint`], one file per
/// (operation kind, target directory) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintStore {
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: BTreeMap<String, Fingerprint>,
}

impl Default for FingerprintStore {
    fn default() -> Self {
        FingerprintStore {
            updated_at: Utc::now(),
            entries: BTreeMap::new(),
        }
    }
}

impl FingerprintStore {
    pub fn lookup(&self, identity: &str) -> Option<&Fingerprint> {
        self.entries.get(identity)
    }

    pub fn record(&mut self, identity: String, fingerprint: Fingerprint) {
        self.entries.insert(identity, fingerprint);
    }
}

// ---------------------------------------------------------------------------
// SyncManifest
// ---------------------------------------------------------------------------

/// Persisted record of what the directory synchronizer previously wrote:
/// target-relative path (with `/` separators) → source content SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncManifest {
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl Default for SyncManifest {
    fn default() -> Self {
        SyncManifest {
            updated_at: Utc::now(),
            entries: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load a persisted JSON document, failing open to `T::default()`.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(err) => {
            tracing::warn!("unreadable cache at {}: {err}; starting empty", path.display());
            return T::default();
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("corrupt cache at {}: {err}; starting empty", path.display());
            T::default()
        }
    }
}

/// Save a JSON document atomically: write `<path>.tmp`, then rename.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), SyncError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Load the fingerprint store at `path`; missing or corrupt → empty.
pub fn load(path: &Path) -> FingerprintStore {
    load_json(path)
}

/// Save the fingerprint store at `path` atomically.
pub fn save(store: &FingerprintStore, path: &Path) -> Result<(), SyncError> {
    save_json(store, path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
