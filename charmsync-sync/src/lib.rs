//! # charmsync-sync
//!
//! One-way directory mirroring.
//!
//! A run scans both roots concurrently into [`TreeSnapshot`]s, classifies
//! every relative path with [`diff`], and applies the resulting
//! [`OperationSet`] through a [`Reconciler`]. Use [`run_sync`] for a single
//! blocking mirror, [`SyncJob`] for finer control, or [`run_plan`] for the
//! ordered pairs of a charm manifest.

pub mod diff;
pub mod error;
pub mod exclude;
pub mod fingerprint;
pub mod fs_ops;
pub mod job;
pub mod pipeline;
pub mod reconcile;
pub mod scanner;
pub mod snapshot;

pub use diff::{diff, OperationSet};
pub use error::SyncError;
pub use exclude::ExclusionMatcher;
pub use fingerprint::Fingerprint;
pub use fs_ops::{FileOps, LocalFs};
pub use job::{scan_pair, SyncJob, SyncReport, DEFAULT_SCAN_DEADLINE};
pub use pipeline::{run_plan, run_sync, PlanOptions};
pub use reconcile::{AppliedOp, OpKind, Reconciler};
pub use scanner::{scan, TreeScanner};
pub use snapshot::{PathEntry, TreeSnapshot};
