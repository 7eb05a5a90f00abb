//! One source/destination reconciliation run.
//!
//! ## `SyncJob::run` — 5-step protocol
//!
//! 1. Compile the exclusion patterns (malformed pattern → `Config`).
//! 2. Ensure the destination root exists (skipped in dry-run mode).
//! 3. Scan both roots as two blocking tasks joined under the deadline.
//! 4. Diff the snapshots.
//! 5. Apply the operation set: deletes, then creates, then updates.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use charmsync_core::{FingerprintMode, SyncPair};

use crate::diff::{diff, OperationSet};
use crate::error::{copy_err, SyncError};
use crate::exclude::ExclusionMatcher;
use crate::fs_ops::{FileOps, LocalFs};
use crate::reconcile::{AppliedOp, OpKind, Reconciler};
use crate::scanner::TreeScanner;
use crate::snapshot::TreeSnapshot;

/// How long the paired scan may take before the run fails.
pub const DEFAULT_SCAN_DEADLINE: Duration = Duration::from_secs(10 * 60);

// ---------------------------------------------------------------------------
// SyncJob
// ---------------------------------------------------------------------------

/// Configuration of a single run. Built with the consuming setters, then
/// only read.
#[derive(Debug, Clone)]
pub struct SyncJob {
    source: PathBuf,
    destination: PathBuf,
    excludes: Vec<String>,
    mode: FingerprintMode,
    deadline: Duration,
    dry_run: bool,
}

impl SyncJob {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            excludes: Vec::new(),
            mode: FingerprintMode::default(),
            deadline: DEFAULT_SCAN_DEADLINE,
            dry_run: false,
        }
    }

    /// Job for one entry of a manifest sync plan.
    pub fn from_pair(pair: &SyncPair) -> Self {
        Self::new(&pair.source, &pair.destination)
            .excludes(&pair.excludes)
            .mode(pair.mode)
    }

    /// Ordered exclusion patterns; replaces any set earlier.
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excludes = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        self
    }

    pub fn mode(mut self, mode: FingerprintMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.excludes
    }

    pub fn fingerprint_mode(&self) -> FingerprintMode {
        self.mode
    }

    pub fn scan_deadline(&self) -> Duration {
        self.deadline
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run on the caller's tokio runtime.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let matcher = Arc::new(ExclusionMatcher::build(&self.excludes)?);
        tracing::info!(
            source = %self.source.display(),
            destination = %self.destination.display(),
            mode = %self.mode,
            dry_run = self.dry_run,
            "sync started"
        );

        let destination_missing = !LocalFs.exists(&self.destination);
        if destination_missing && !self.dry_run {
            LocalFs
                .create_dir_all(&self.destination)
                .map_err(|e| copy_err(&self.destination, e))?;
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let scanner = TreeScanner::new(matcher.clone(), self.mode).with_cancel(cancel.clone());
        let source_scan = {
            let scanner = scanner.clone();
            let root = self.source.clone();
            move || scanner.scan(&root)
        };
        let destination_scan = {
            let root = self.destination.clone();
            let dry_run_into_nothing = destination_missing && self.dry_run;
            move || {
                if dry_run_into_nothing {
                    Ok(TreeSnapshot::default())
                } else {
                    scanner.scan(&root)
                }
            }
        };

        let scanned = scan_pair(self.deadline, source_scan, destination_scan).await;
        let (source_snapshot, destination_snapshot) = match scanned {
            Ok(pair) => pair,
            Err(err) => {
                cancel.store(true, Ordering::Relaxed);
                return Err(err);
            }
        };

        let job = self.clone();
        let applied = tokio::task::spawn_blocking(move || {
            let operations = diff(&source_snapshot, &destination_snapshot, job.mode);
            let applied = Reconciler::new(&matcher)
                .dry_run(job.dry_run)
                .apply(&operations, &job.source, &job.destination)?;
            Ok::<_, SyncError>((operations, applied))
        })
        .await
        .map_err(|e| SyncError::Task(format!("apply task join error: {e}")))?;
        let (operations, applied) = applied?;

        let report = SyncReport {
            source: self.source.clone(),
            destination: self.destination.clone(),
            operations,
            applied,
            dry_run: self.dry_run,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            deleted = report.deleted(),
            copied = report.copied(),
            unchanged = report.unchanged(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "sync finished"
        );
        Ok(report)
    }

    /// Run on a private runtime and block until done.
    ///
    /// Returns [`SyncError::Task`] when called from inside a tokio runtime,
    /// where blocking is not allowed; await [`SyncJob::run`] there instead.
    pub fn run_blocking(&self) -> Result<SyncReport, SyncError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SyncError::Task(
                "run_blocking called inside a tokio runtime; await SyncJob::run instead".into(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| SyncError::Task(format!("tokio runtime: {e}")))?;
        let result = runtime.block_on(self.run());
        // A timed-out scan may still be unwinding on a blocking thread.
        runtime.shutdown_background();
        result
    }
}

// ---------------------------------------------------------------------------
// Paired scan
// ---------------------------------------------------------------------------

/// Run both scans concurrently and wait for both, for the first failure, or
/// for `deadline`, whichever comes first.
///
/// Must be called from within a tokio runtime.
pub async fn scan_pair<S, D>(
    deadline: Duration,
    scan_source: S,
    scan_destination: D,
) -> Result<(TreeSnapshot, TreeSnapshot), SyncError>
where
    S: FnOnce() -> Result<TreeSnapshot, SyncError> + Send + 'static,
    D: FnOnce() -> Result<TreeSnapshot, SyncError> + Send + 'static,
{
    let source = tokio::task::spawn_blocking(scan_source);
    let destination = tokio::task::spawn_blocking(scan_destination);
    let both = async { tokio::try_join!(joined(source), joined(destination)) };

    match tokio::time::timeout(deadline, both).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(deadline = ?deadline, "tree scan deadline exceeded");
            Err(SyncError::Timeout { deadline })
        }
    }
}

async fn joined(
    handle: JoinHandle<Result<TreeSnapshot, SyncError>>,
) -> Result<TreeSnapshot, SyncError> {
    handle
        .await
        .map_err(|e| SyncError::Task(format!("scan task join error: {e}")))?
}

// ---------------------------------------------------------------------------
// SyncReport
// ---------------------------------------------------------------------------

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub operations: OperationSet,
    pub applied: Vec<AppliedOp>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl SyncReport {
    fn count(&self, kind: OpKind) -> usize {
        self.applied.iter().filter(|op| op.kind == kind).count()
    }

    pub fn deleted(&self) -> usize {
        self.count(OpKind::Delete)
    }

    /// Files created or overwritten.
    pub fn copied(&self) -> usize {
        self.count(OpKind::Create) + self.count(OpKind::Update)
    }

    pub fn unchanged(&self) -> usize {
        self.operations.skip.len()
    }
}
