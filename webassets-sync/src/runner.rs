//! Incremental operation runner.
//!
//! Executes caller-supplied work only for input identities whose recorded
//! fingerprint is missing or stale, skips the rest, and tracks results
//! per identity so one failure never masks another's success.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::Utc;

use webassets_core::{FileStamp, Source};

use crate::error::SyncError;
use crate::store::{self, Fingerprint};
use crate::syncer::write_atomic;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Per-identity results returned by a work function: the new fingerprint on
/// success, an error value on failure.
pub type WorkResults = BTreeMap<String, Result<Fingerprint, SyncError>>;

/// Outcome of one [`run_incremental`] call.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Union of output files: newly produced plus those recorded for
    /// unchanged identities.
    pub outputs: BTreeSet<PathBuf>,
    /// Identities processed by the work function this run.
    pub refreshed: Vec<String>,
    /// Identities skipped because their fingerprint was still current.
    pub skipped: Vec<String>,
    /// Per-identity failures, collected rather than thrown.
    pub failures: Vec<(String, SyncError)>,
}

impl RunReport {
    /// True when no identity failed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// run_incremental
// ---------------------------------------------------------------------------

/// Run `work` for the subset of `identities` whose cached fingerprint is
/// missing or stale, then persist the updated store.
///
/// `work` is invoked exactly once with the full changed subset, letting it
/// batch I/O (one archive scan covering many entries). It must return a
/// result for every identity it was given; a dropped identity is treated
/// as failed. Failed identities keep their stale-or-absent fingerprint, so
/// the next run retries them — failure is never cached as success.
pub fn run_incremental<F>(
    cache_path: &Path,
    identities: &[String],
    work: F,
) -> Result<RunReport, SyncError>
where
    F: FnOnce(&[String]) -> WorkResults,
{
    let mut store = store::load(cache_path);

    let mut report = RunReport::default();
    let mut changed = Vec::new();
    for identity in identities {
        match store.lookup(identity) {
            Some(fingerprint) if fingerprint.is_current() => {
                tracing::debug!("unchanged: {identity}");
                report.outputs.extend(fingerprint.outputs().cloned());
                report.skipped.push(identity.clone());
            }
            _ => changed.push(identity.clone()),
        }
    }

    if !changed.is_empty() {
        let mut results = work(&changed);
        for identity in changed {
            match results.remove(&identity) {
                Some(Ok(fingerprint)) => {
                    tracing::info!("refreshed: {identity}");
                    report.outputs.extend(fingerprint.outputs().cloned());
                    store.record(identity.clone(), fingerprint);
                    report.refreshed.push(identity);
                }
                Some(Err(err)) => {
                    tracing::warn!("failed: {identity}: {err}");
                    report.failures.push((identity, err));
                }
                None => {
                    let err = SyncError::MissingWorkResult {
                        identity: identity.clone(),
                    };
                    report.failures.push((identity, err));
                }
            }
        }
    }

    store.updated_at = Utc::now();
    store::save(&store, cache_path)?;
    Ok(report)
}

// ---------------------------------------------------------------------------
// copy_resource
// ---------------------------------------------------------------------------

/// Incremental copy of a single named resource to `target`.
///
/// Skips the copy when the cached source digest matches the current source
/// and the previously written target is still intact. A source that cannot
/// be opened fails immediately, naming the missing resource.
pub fn copy_resource(
    cache_path: &Path,
    source: &Source,
    target: &Path,
) -> Result<PathBuf, SyncError> {
    let identity = source.name();
    let current = source.stamp()?;

    let mut store = store::load(cache_path);
    if let Some(fingerprint) = store.lookup(&identity) {
        let read_key = PathBuf::from(&identity);
        let source_unchanged = fingerprint
            .reads
            .get(&read_key)
            .is_some_and(|stamp| stamp.sha256 == current.sha256);
        let target_intact = fingerprint
            .writes
            .iter()
            .all(|(path, stamp)| stamp.matches_disk(path));
        if source_unchanged && target_intact {
            tracing::debug!("unchanged: {identity}");
            return Ok(target.to_path_buf());
        }
    }

    let content = source.read()?;
    write_atomic(target, &content)?;
    tracing::info!("copied {identity} -> {}", target.display());

    let mut fingerprint = Fingerprint::default();
    fingerprint.reads.insert(PathBuf::from(&identity), current);
    fingerprint
        .writes
        .insert(target.to_path_buf(), FileStamp::of_file(target)?);
    store.record(identity, fingerprint);
    store.updated_at = Utc::now();
    store::save(&store, cache_path)?;

    Ok(target.to_path_buf())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    use webassets_core::CoreError;

    fn produce(out: &Path, content: &[u8]) -> Result<Fingerprint, SyncError> {
        write_atomic(out, content)?;
        let mut fp = Fingerprint::default();
        fp.writes.insert(out.to_path_buf(), FileStamp::of_file(out)?);
        Ok(fp)
    }

    #[test]
    fn first_run_processes_everything_second_run_skips() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let out_dir = tmp.path().join("out");
        let ids = vec!["a.js".to_string(), "b.js".to_string()];

        let calls = Cell::new(0);
        let report = run_incremental(&cache, &ids, |changed| {
            calls.set(calls.get() + 1);
            changed
                .iter()
                .map(|id| (id.clone(), produce(&out_dir.join(id), id.as_bytes())))
                .collect()
        })
        .unwrap();
        assert_eq!(calls.get(), 1, "work must be invoked once, batched");
        assert_eq!(report.refreshed.len(), 2);
        assert!(report.is_ok());

        let report = run_incremental(&cache, &ids, |changed| {
            panic!("nothing changed, work should not run; got {changed:?}")
        })
        .unwrap();
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.outputs.len(), 2, "skipped outputs still reported");
    }

    #[test]
    fn deleted_output_forces_reprocessing() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let out = tmp.path().join("out").join("a.js");
        let ids = vec!["a.js".to_string()];

        run_incremental(&cache, &ids, |changed| {
            changed
                .iter()
                .map(|id| (id.clone(), produce(&out, b"v1")))
                .collect()
        })
        .unwrap();

        std::fs::remove_file(&out).unwrap();

        let report = run_incremental(&cache, &ids, |changed| {
            changed
                .iter()
                .map(|id| (id.clone(), produce(&out, b"v1")))
                .collect()
        })
        .unwrap();
        assert_eq!(report.refreshed, vec!["a.js".to_string()]);
        assert!(out.exists());
    }

    #[test]
    fn touched_read_file_forces_reprocessing() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let input = tmp.path().join("in.js");
        let out = tmp.path().join("out.js");
        std::fs::write(&input, b"src").unwrap();
        let ids = vec!["in.js".to_string()];

        let work = |changed: &[String]| -> WorkResults {
            changed
                .iter()
                .map(|id| {
                    let result = (|| {
                        write_atomic(&out, b"compiled")?;
                        let mut fp = Fingerprint::default();
                        fp.reads.insert(input.clone(), FileStamp::of_file(&input)?);
                        fp.writes.insert(out.clone(), FileStamp::of_file(&out)?);
                        Ok(fp)
                    })();
                    (id.clone(), result)
                })
                .collect()
        };

        run_incremental(&cache, &ids, work).unwrap();

        // Bump the input mtime well past filesystem timestamp granularity.
        let future = filetime::FileTime::from_unix_time(4_102_444_800, 0);
        filetime::set_file_mtime(&input, future).unwrap();

        let report = run_incremental(&cache, &ids, work).unwrap();
        assert_eq!(report.refreshed, vec!["in.js".to_string()]);
    }

    #[test]
    fn failure_is_not_cached_as_success() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let out_dir = tmp.path().join("out");
        let ids = vec!["bad.js".to_string(), "good.js".to_string()];

        let report = run_incremental(&cache, &ids, |changed| {
            changed
                .iter()
                .map(|id| {
                    if id == "bad.js" {
                        (
                            id.clone(),
                            Err(SyncError::Core(CoreError::MissingResource {
                                name: id.clone(),
                            })),
                        )
                    } else {
                        (id.clone(), produce(&out_dir.join(id), b"ok"))
                    }
                })
                .collect()
        })
        .unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.refreshed, vec!["good.js".to_string()]);

        // Next run retries only the failed identity.
        let report = run_incremental(&cache, &ids, |changed| {
            assert_eq!(changed, ["bad.js".to_string()]);
            changed
                .iter()
                .map(|id| (id.clone(), produce(&out_dir.join(id), b"ok")))
                .collect()
        })
        .unwrap();
        assert!(report.is_ok());
        assert_eq!(report.skipped, vec!["good.js".to_string()]);
    }

    #[test]
    fn dropped_identity_is_reported_as_failure() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let ids = vec!["forgotten.js".to_string()];

        let report = run_incremental(&cache, &ids, |_| WorkResults::new()).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].1,
            SyncError::MissingWorkResult { .. }
        ));
    }

    #[test]
    fn copy_resource_is_incremental() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let src = tmp.path().join("src.js");
        let dst = tmp.path().join("public").join("src.js");
        std::fs::write(&src, b"v1").unwrap();

        copy_resource(&cache, &Source::File(src.clone()), &dst).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"v1");
        let mtime_1 = std::fs::metadata(&dst).unwrap().modified().unwrap();

        // Unchanged source: no rewrite.
        copy_resource(&cache, &Source::File(src.clone()), &dst).unwrap();
        let mtime_2 = std::fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(mtime_1, mtime_2, "no-op copy must not rewrite the target");

        // Changed content: rewrite.
        std::fs::write(&src, b"v2 longer").unwrap();
        copy_resource(&cache, &Source::File(src), &dst).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"v2 longer");
    }

    #[test]
    fn copy_resource_rewrites_deleted_target() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let dst = tmp.path().join("out.js");
        let source = Source::Bytes {
            name: "embedded:out.js".into(),
            content: b"body{}".to_vec(),
        };

        copy_resource(&cache, &source, &dst).unwrap();
        std::fs::remove_file(&dst).unwrap();
        copy_resource(&cache, &source, &dst).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"body{}");
    }

    #[test]
    fn copy_resource_fails_on_missing_source() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache.json");
        let source = Source::File(tmp.path().join("no-such.js"));

        let err = copy_resource(&cache, &source, &tmp.path().join("out.js"))
            .expect_err("missing resource must fail");
        match err {
            SyncError::Core(CoreError::MissingResource { name }) => {
                assert!(name.contains("no-such.js"));
            }
            other => panic!("expected MissingResource, got {other:?}"),
        }
        assert!(!cache.exists(), "failed copy must not persist a cache");
    }
}
