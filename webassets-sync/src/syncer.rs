//! Directory synchronizer.
//!
//! Converges a destination directory to exactly match a mapping set:
//! copies new/changed files, deletes previously tracked files that are no
//! longer mapped, and leaves everything else alone. A persisted manifest
//! records what was written last time, so repeat runs with unchanged
//! sources perform zero writes.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;

use webassets_core::{PathMapping, Source};

use crate::error::{io_err, SyncError};
use crate::store::{self, SyncManifest};

// ---------------------------------------------------------------------------
// Atomic write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically: parents created, `.webassets.tmp`
/// written, then renamed over the final path.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.webassets.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The decision a sync would apply, target-relative paths throughout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub copies: Vec<PathBuf>,
    pub deletes: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl SyncPlan {
    /// True when applying the plan would perform no filesystem operation.
    pub fn is_noop(&self) -> bool {
        self.copies.is_empty() && self.deletes.is_empty()
    }
}

/// Outcome of an applied sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The destination root; callers treat the whole directory as the result.
    pub dest_root: PathBuf,
    pub copied: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

/// Manifest key for a target-relative path: `/`-separated on every platform.
fn key(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Dedupe mappings by target path, later entries overriding earlier ones
/// (overlay semantics — test assets may shadow main assets), and pair each
/// survivor with its current source digest.
fn resolve(mappings: &[PathMapping]) -> Result<BTreeMap<String, (&Source, String)>, SyncError> {
    let mut desired = BTreeMap::new();
    for mapping in mappings {
        let digest = mapping.source.digest()?;
        desired.insert(key(&mapping.target), (&mapping.source, digest));
    }
    Ok(desired)
}

fn plan_against(
    manifest: &SyncManifest,
    desired: &BTreeMap<String, (&Source, String)>,
    dest_root: &Path,
) -> SyncPlan {
    let mut plan = SyncPlan::default();
    for (target, (_, digest)) in desired {
        let tracked = manifest.entries.get(target);
        let on_disk = dest_root.join(target).exists();
        if tracked == Some(digest) && on_disk {
            plan.unchanged.push(PathBuf::from(target));
        } else {
            plan.copies.push(PathBuf::from(target));
        }
    }
    for tracked in manifest.entries.keys() {
        if !desired.contains_key(tracked) {
            plan.deletes.push(PathBuf::from(tracked));
        }
    }
    plan
}

/// Compute what [`sync`] would do, without touching the destination.
pub fn plan(
    manifest_path: &Path,
    mappings: &[PathMapping],
    dest_root: &Path,
) -> Result<SyncPlan, SyncError> {
    let manifest: SyncManifest = store::load_json(manifest_path);
    let desired = resolve(mappings)?;
    Ok(plan_against(&manifest, &desired, dest_root))
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Converge `dest_root` to exactly match `mappings`, then persist the new
/// manifest. On any write failure the error propagates and the manifest is
/// left untouched, so the next run retries the full delta.
pub fn sync(
    manifest_path: &Path,
    mappings: &[PathMapping],
    dest_root: &Path,
) -> Result<SyncOutcome, SyncError> {
    sync_retaining(manifest_path, mappings, dest_root, &|_| false)
}

/// [`sync`], but tracked entries matching `retain` are kept on disk and
/// carried forward in the manifest even when no longer mapped. Used when a
/// producer failed this run: its previous outputs must survive until it
/// succeeds again.
pub fn sync_retaining(
    manifest_path: &Path,
    mappings: &[PathMapping],
    dest_root: &Path,
    retain: &dyn Fn(&str) -> bool,
) -> Result<SyncOutcome, SyncError> {
    let manifest: SyncManifest = store::load_json(manifest_path);
    let desired = resolve(mappings)?;
    let mut plan = plan_against(&manifest, &desired, dest_root);

    let mut retained: BTreeMap<String, String> = BTreeMap::new();
    plan.deletes.retain(|target| {
        let target_key = key(target);
        if retain(&target_key) {
            if let Some(digest) = manifest.entries.get(&target_key) {
                retained.insert(target_key, digest.clone());
            }
            false
        } else {
            true
        }
    });

    for target in &plan.copies {
        let (source, _) = &desired[&key(target)];
        let content = source.read()?;
        let dest = dest_root.join(target);
        write_atomic(&dest, &content)?;
        tracing::info!("wrote: {}", dest.display());
    }

    // Only files this synchronizer previously tracked are ever deleted;
    // untracked files in the destination are left alone.
    for target in &plan.deletes {
        let dest = dest_root.join(target);
        match std::fs::remove_file(&dest) {
            Ok(()) => tracing::info!("deleted: {}", dest.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(io_err(&dest, err)),
        }
    }

    let mut entries: BTreeMap<String, String> = desired
        .into_iter()
        .map(|(target, (_, digest))| (target, digest))
        .collect();
    entries.extend(retained);
    let next = SyncManifest {
        updated_at: Utc::now(),
        entries,
    };
    store::save_json(&next, manifest_path)?;

    Ok(SyncOutcome {
        dest_root: dest_root.to_path_buf(),
        copied: plan.copies,
        deleted: plan.deletes,
        unchanged: plan.unchanged,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
