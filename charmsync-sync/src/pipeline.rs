//! Shared sync entrypoints used by the CLI.

use std::path::PathBuf;
use std::time::Duration;

use charmsync_core::{FingerprintMode, SyncPair};

use crate::job::{SyncJob, SyncReport, DEFAULT_SCAN_DEADLINE};
use crate::SyncError;

/// Mirror `source` into `destination` once, blocking the caller.
///
/// Must not be called from inside a tokio runtime; see
/// [`SyncJob::run_blocking`].
pub fn run_sync<I, S>(
    source: impl Into<PathBuf>,
    destination: impl Into<PathBuf>,
    exclusion_patterns: I,
    mode: FingerprintMode,
) -> Result<SyncReport, SyncError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SyncJob::new(source, destination)
        .excludes(exclusion_patterns)
        .mode(mode)
        .run_blocking()
}

/// Settings applied to every pair of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    pub dry_run: bool,
    pub deadline: Duration,
    /// Replaces each pair's own mode when set.
    pub mode: Option<FingerprintMode>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            deadline: DEFAULT_SCAN_DEADLINE,
            mode: None,
        }
    }
}

/// Run every pair in order. The first failure stops the plan; pairs already
/// applied stay applied. Like [`run_sync`], not for use inside a runtime.
pub fn run_plan(plan: &[SyncPair], options: PlanOptions) -> Result<Vec<SyncReport>, SyncError> {
    let mut reports = Vec::with_capacity(plan.len());
    for (index, pair) in plan.iter().enumerate() {
        let mut job = SyncJob::from_pair(pair)
            .dry_run(options.dry_run)
            .deadline(options.deadline);
        if let Some(mode) = options.mode {
            job = job.mode(mode);
        }
        tracing::debug!(step = index + 1, total = plan.len(), "running sync pair");
        reports.push(job.run_blocking()?);
    }
    Ok(reports)
}
