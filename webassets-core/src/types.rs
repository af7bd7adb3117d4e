//! Domain types for the webassets engine.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. Mapping targets are always destination-relative.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{io_err, CoreError};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for an asset module (a WebJar, a compiled bundle).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleName(pub String);

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ModuleName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ModuleName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// SHA-256 hex digest of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// FileStamp
// ---------------------------------------------------------------------------

/// Content fingerprint of one file: length, modification time, SHA-256.
///
/// Length + mtime give a cheap staleness probe against the filesystem; the
/// digest detects content changes under coarse timestamp resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStamp {
    pub len: u64,
    pub mtime_ms: i64,
    pub sha256: String,
}

impl FileStamp {
    /// Stamp a file on disk, reading its content for the digest.
    pub fn of_file(path: &Path) -> Result<FileStamp, CoreError> {
        let content = std::fs::read(path).map_err(|e| io_err(path, e))?;
        let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
        Ok(FileStamp {
            len: meta.len(),
            mtime_ms: mtime_ms(&meta),
            sha256: sha256_hex(&content),
        })
    }

    /// Stamp an in-memory byte buffer. Carries no modification time.
    pub fn of_bytes(content: &[u8]) -> FileStamp {
        FileStamp {
            len: content.len() as u64,
            mtime_ms: 0,
            sha256: sha256_hex(content),
        }
    }

    /// Cheap probe: does `path` still have the recorded length and mtime?
    ///
    /// A missing or unreadable file is a mismatch, never an error — staleness
    /// forces reprocessing, which is the safe direction.
    pub fn matches_disk(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => meta.len() == self.len && mtime_ms(&meta) == self.mtime_ms,
            Err(_) => false,
        }
    }
}

fn mtime_ms(meta: &std::fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A source locator: where mapped content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A file on disk.
    File(PathBuf),
    /// In-memory bytes, labeled for diagnostics (archive entry, fetched body).
    Bytes { name: String, content: Vec<u8> },
}

impl Source {
    /// Human-readable locator name, used in errors and logs.
    pub fn name(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Bytes { name, .. } => name.clone(),
        }
    }

    /// Read the full content of this source.
    ///
    /// A file locator that does not exist fails with
    /// [`CoreError::MissingResource`] naming the resource.
    pub fn read(&self) -> Result<Vec<u8>, CoreError> {
        match self {
            Source::File(path) => match std::fs::read(path) {
                Ok(content) => Ok(content),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    Err(CoreError::MissingResource { name: self.name() })
                }
                Err(err) => Err(io_err(path, err)),
            },
            Source::Bytes { content, .. } => Ok(content.clone()),
        }
    }

    /// SHA-256 hex digest of the source content.
    pub fn digest(&self) -> Result<String, CoreError> {
        Ok(sha256_hex(&self.read()?))
    }

    /// Full stamp of the source. File sources carry real length and mtime;
    /// byte sources carry length and digest only.
    pub fn stamp(&self) -> Result<FileStamp, CoreError> {
        match self {
            Source::File(path) => {
                // Probe existence through read() so missing files surface as
                // MissingResource rather than a raw I/O error.
                let content = self.read()?;
                let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
                Ok(FileStamp {
                    len: meta.len(),
                    mtime_ms: mtime_ms(&meta),
                    sha256: sha256_hex(&content),
                })
            }
            Source::Bytes { content, .. } => Ok(FileStamp::of_bytes(content)),
        }
    }
}

// ---------------------------------------------------------------------------
// PathMapping
// ---------------------------------------------------------------------------

/// A (source, target-relative path) pair describing where content should
/// land under a destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub source: Source,
    /// Always relative to the destination root.
    pub target: PathBuf,
}

impl PathMapping {
    /// Build a mapping, rejecting absolute target paths.
    pub fn new(source: Source, target: impl Into<PathBuf>) -> Result<PathMapping, CoreError> {
        let target = target.into();
        if target.is_absolute() {
            return Err(CoreError::AbsoluteTarget { path: target });
        }
        Ok(PathMapping { source, target })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn module_name_display() {
        assert_eq!(ModuleName::from("jquery").to_string(), "jquery");
    }

    #[test]
    fn file_stamp_roundtrip_matches_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.js");
        std::fs::write(&path, b"alert(1);").unwrap();

        let stamp = FileStamp::of_file(&path).unwrap();
        assert_eq!(stamp.len, 9);
        assert!(stamp.matches_disk(&path));
        assert_eq!(stamp.sha256, sha256_hex(b"alert(1);"));
    }

    #[test]
    fn stamp_mismatch_when_file_deleted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.js");
        std::fs::write(&path, b"x").unwrap();
        let stamp = FileStamp::of_file(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(!stamp.matches_disk(&path));
    }

    #[test]
    fn missing_file_source_is_missing_resource() {
        let source = Source::File(PathBuf::from("/nonexistent/thing.js"));
        let err = source.read().expect_err("should fail");
        match err {
            CoreError::MissingResource { name } => {
                assert!(name.contains("thing.js"));
            }
            other => panic!("expected MissingResource, got {other:?}"),
        }
    }

    #[test]
    fn bytes_source_digest_matches_file_source_with_same_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.css");
        std::fs::write(&path, b"body{}").unwrap();

        let from_file = Source::File(path).digest().unwrap();
        let from_bytes = Source::Bytes {
            name: "x.css".into(),
            content: b"body{}".to_vec(),
        }
        .digest()
        .unwrap();
        assert_eq!(from_file, from_bytes);
    }

    #[test]
    fn mapping_rejects_absolute_target() {
        let source = Source::Bytes {
            name: "a".into(),
            content: vec![],
        };
        let err = PathMapping::new(source, "/etc/passwd").expect_err("absolute");
        assert!(matches!(err, CoreError::AbsoluteTarget { .. }));
    }
}
