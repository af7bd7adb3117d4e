//! # webassets-sync
//!
//! The incremental extraction/synchronization engine.
//!
//! Three layers, leaves first:
//! - [`store`] — persisted fingerprint store with atomic replace-on-save and
//!   fail-open loading.
//! - [`runner`] — [`runner::run_incremental`]: skip inputs whose recorded
//!   fingerprints still match the filesystem, batch the rest through a
//!   caller-supplied work function, report per-input results.
//! - [`syncer`] — [`syncer::sync`]: converge a destination directory to
//!   exactly match a mapping set, using a persisted manifest to detect and
//!   remove stale outputs.

pub mod error;
pub mod layout;
pub mod runner;
pub mod store;
pub mod syncer;

pub use error::SyncError;
pub use layout::CacheLayout;
pub use runner::{copy_resource, run_incremental, RunReport, WorkResults};
pub use store::{Fingerprint, FingerprintStore, SyncManifest};
pub use syncer::{plan, sync, sync_retaining, SyncOutcome, SyncPlan};
