//! Bulk WebJar extraction.
//!
//! Enumerates modules from a [`ResourceNamespace`], applies the name
//! filter, and converges the destination's `<lib>/<module>/...` tree via
//! the directory synchronizer. Re-running against an unchanged namespace
//! performs zero writes.

use std::path::{Path, PathBuf};

use webassets_core::{ModuleName, PathMapping, Source};
use webassets_sync::{syncer, CacheLayout, SyncOutcome};

use crate::error::WebJarError;
use crate::filter::NameFilter;
use crate::namespace::ResourceNamespace;

/// Cache file kind for extraction manifests under a [`CacheLayout`].
const CACHE_KIND: &str = "webjars";

/// Extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Name of the library folder modules land under, relative to the
    /// destination root.
    pub lib_dir: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            lib_dir: "lib".to_string(),
        }
    }
}

/// Outcome of one extraction run.
#[derive(Debug)]
pub struct ExtractReport {
    pub dest_root: PathBuf,
    /// Modules that passed the filter and were read successfully.
    pub modules: Vec<ModuleName>,
    /// Modules whose entries could not be read; their previously extracted
    /// files are left in place and retried next run.
    pub failures: Vec<(ModuleName, WebJarError)>,
    pub outcome: SyncOutcome,
}

impl ExtractReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Extract every module accepted by `filter` into
/// `<dest_root>/<lib_dir>/<module>/...`.
///
/// A module that cannot be read is a per-module failure; the remaining
/// modules still extract, and the failed module's prior outputs are
/// retained rather than treated as stale.
pub fn extract<N: ResourceNamespace>(
    namespace: &N,
    filter: &NameFilter,
    options: &ExtractOptions,
    cache: &CacheLayout,
    dest_root: &Path,
) -> Result<ExtractReport, WebJarError> {
    let manifest_path = cache.cache_path(CACHE_KIND, dest_root);

    let mut modules = Vec::new();
    let mut failures = Vec::new();
    let mut mappings = Vec::new();
    for module in namespace.modules()? {
        if !filter.accepts(&module) {
            tracing::debug!("filtered out: {module}");
            continue;
        }
        match module_mappings(namespace, &options.lib_dir, &module) {
            Ok(mut module_maps) => {
                mappings.append(&mut module_maps);
                modules.push(module);
            }
            Err(err) => {
                tracing::warn!("module '{module}' unreadable: {err}");
                failures.push((module, err));
            }
        }
    }

    let protected: Vec<String> = failures
        .iter()
        .map(|(module, _)| format!("{}/{}/", options.lib_dir, module.0))
        .collect();
    let outcome = syncer::sync_retaining(&manifest_path, &mappings, dest_root, &|key| {
        protected.iter().any(|prefix| key.starts_with(prefix.as_str()))
    })?;

    Ok(ExtractReport {
        dest_root: outcome.dest_root.clone(),
        modules,
        failures,
        outcome,
    })
}

fn module_mappings<N: ResourceNamespace>(
    namespace: &N,
    lib_dir: &str,
    module: &ModuleName,
) -> Result<Vec<PathMapping>, WebJarError> {
    let mut mappings = Vec::new();
    for entry in namespace.entries(module)? {
        let content = namespace.open(module, &entry)?;
        let source = Source::Bytes {
            name: format!("webjar:{module}/{}", entry.display()),
            content,
        };
        let target = Path::new(lib_dir).join(&module.0).join(&entry);
        mappings.push(PathMapping::new(source, target)?);
    }
    Ok(mappings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
