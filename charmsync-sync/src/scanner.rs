//! Tree traversal into a [`TreeSnapshot`].
//!
//! Symlinks are recorded from `lstat` and never followed or read. Excluded
//! entries are pruned before descent, so nothing below an excluded directory
//! is ever visited.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use charmsync_core::FingerprintMode;

use crate::error::{scan_err, SyncError};
use crate::exclude::ExclusionMatcher;
use crate::fingerprint::Fingerprint;
use crate::snapshot::{PathEntry, TreeSnapshot};

/// Snapshot `root` with the given matcher and fingerprint mode.
pub fn scan(
    root: &Path,
    matcher: &ExclusionMatcher,
    mode: FingerprintMode,
) -> Result<TreeSnapshot, SyncError> {
    scan_tree(root, matcher, mode, None)
}

/// Owned scanner configuration, movable into a blocking task.
#[derive(Debug, Clone)]
pub struct TreeScanner {
    matcher: Arc<ExclusionMatcher>,
    mode: FingerprintMode,
    cancel: Option<Arc<AtomicBool>>,
}

impl TreeScanner {
    pub fn new(matcher: Arc<ExclusionMatcher>, mode: FingerprintMode) -> Self {
        Self {
            matcher,
            mode,
            cancel: None,
        }
    }

    /// Stop early once `flag` is set; the scan then fails with
    /// [`SyncError::Task`].
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn scan(&self, root: &Path) -> Result<TreeSnapshot, SyncError> {
        scan_tree(root, &self.matcher, self.mode, self.cancel.as_deref())
    }
}

fn scan_tree(
    root: &Path,
    matcher: &ExclusionMatcher,
    mode: FingerprintMode,
    cancel: Option<&AtomicBool>,
) -> Result<TreeSnapshot, SyncError> {
    let root_meta = std::fs::metadata(root).map_err(|e| scan_err(root, e))?;
    if !root_meta.is_dir() {
        return Err(scan_err(
            root,
            io::Error::other("sync root is not a directory"),
        ));
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || e.path()
                    .strip_prefix(root)
                    .map(|rel| !matcher.is_excluded(rel))
                    .unwrap_or(true)
        });

    let mut entries: Vec<(PathBuf, PathEntry)> = Vec::new();
    for item in walker {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(SyncError::Task(format!(
                "scan of {} cancelled",
                root.display()
            )));
        }

        let entry = item.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            scan_err(path, io::Error::from(err))
        })?;
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| scan_err(entry.path(), io::Error::other(e)))?
            .to_path_buf();

        let file_type = entry.file_type();
        let is_symlink = file_type.is_symlink();
        let is_dir = file_type.is_dir();
        let metadata = entry.metadata().map_err(|err| {
            scan_err(entry.path(), io::Error::from(err))
        })?;

        let fingerprint = if mode.hashes_content() && !is_dir && !is_symlink {
            Some(Fingerprint::of_file(entry.path()).map_err(|e| scan_err(entry.path(), e))?)
        } else {
            None
        };

        entries.push((
            relative,
            PathEntry {
                is_dir,
                is_symlink,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                fingerprint,
            },
        ));
    }

    tracing::debug!(
        root = %root.display(),
        entries = entries.len(),
        mode = %mode,
        "scanned tree"
    );
    Ok(entries.into_iter().collect())
}
