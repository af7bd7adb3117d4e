//! Resource namespaces: where bundled asset modules come from.
//!
//! The trait replaces any implicit classloader-style lookup with an
//! explicit collaborator: list modules, list a module's entries, open an
//! entry's bytes. Archive scanning, directory trees, and network fetches
//! are all valid implementations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use webassets_core::ModuleName;

use crate::error::{io_err, WebJarError};

/// An enumerable set of named asset modules with readable entries.
pub trait ResourceNamespace {
    /// All module names reachable from this namespace, sorted.
    fn modules(&self) -> Result<Vec<ModuleName>, WebJarError>;

    /// Relative entry paths under one module, sorted.
    fn entries(&self, module: &ModuleName) -> Result<Vec<PathBuf>, WebJarError>;

    /// Full content of one entry.
    fn open(&self, module: &ModuleName, entry: &Path) -> Result<Vec<u8>, WebJarError>;
}

// ---------------------------------------------------------------------------
// DirNamespace
// ---------------------------------------------------------------------------

/// Filesystem namespace: each immediate subdirectory of `root` is a module,
/// its files (recursively) are the module's entries.
#[derive(Debug, Clone)]
pub struct DirNamespace {
    root: PathBuf,
}

impl DirNamespace {
    pub fn new(root: impl Into<PathBuf>) -> DirNamespace {
        DirNamespace { root: root.into() }
    }

    fn module_dir(&self, module: &ModuleName) -> PathBuf {
        self.root.join(&module.0)
    }
}

impl ResourceNamespace for DirNamespace {
    fn modules(&self) -> Result<Vec<ModuleName>, WebJarError> {
        if !self.root.exists() {
            return Ok(vec![]);
        }
        let mut names: Vec<ModuleName> = std::fs::read_dir(&self.root)
            .map_err(|e| io_err(&self.root, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| ModuleName::from(e.file_name().to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    fn entries(&self, module: &ModuleName) -> Result<Vec<PathBuf>, WebJarError> {
        let dir = self.module_dir(module);
        let mut entries = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                io_err(path, e.into_io_error().unwrap_or_else(|| std::io::Error::other("walk error")))
            })?;
            if entry.file_type().is_file() {
                let rel = entry
                    .path()
                    .strip_prefix(&dir)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                entries.push(rel);
            }
        }
        Ok(entries)
    }

    fn open(&self, module: &ModuleName, entry: &Path) -> Result<Vec<u8>, WebJarError> {
        let path = self.module_dir(module).join(entry);
        match std::fs::read(&path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(WebJarError::NoSuchEntry {
                    module: module.to_string(),
                    entry: entry.to_path_buf(),
                })
            }
            Err(err) => Err(io_err(path, err)),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryNamespace
// ---------------------------------------------------------------------------

/// In-memory namespace for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryNamespace {
    modules: BTreeMap<ModuleName, BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryNamespace {
    pub fn new() -> MemoryNamespace {
        MemoryNamespace::default()
    }

    /// Add one entry, creating the module if needed.
    pub fn insert(
        &mut self,
        module: impl Into<ModuleName>,
        entry: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
    ) {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(entry.into(), content.into());
    }
}

impl ResourceNamespace for MemoryNamespace {
    fn modules(&self) -> Result<Vec<ModuleName>, WebJarError> {
        Ok(self.modules.keys().cloned().collect())
    }

    fn entries(&self, module: &ModuleName) -> Result<Vec<PathBuf>, WebJarError> {
        Ok(self
            .modules
            .get(module)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn open(&self, module: &ModuleName, entry: &Path) -> Result<Vec<u8>, WebJarError> {
        self.modules
            .get(module)
            .and_then(|entries| entries.get(entry))
            .cloned()
            .ok_or_else(|| WebJarError::NoSuchEntry {
                module: module.to_string(),
                entry: entry.to_path_buf(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
