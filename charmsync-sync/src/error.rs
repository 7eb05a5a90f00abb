//! Error types for charmsync-sync.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// All errors that can arise from scanning, diffing, or applying a sync.
///
/// Every variant is terminal for the run it occurs in.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Stat, walk, or digest failure while building a snapshot.
    #[error("scan failed at {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The paired traversal did not finish before the deadline.
    #[error("tree scan exceeded the {deadline:?} deadline")]
    Timeout { deadline: Duration },

    /// An exclusion pattern is not a valid regular expression.
    #[error("invalid exclusion pattern '{pattern}': {source}")]
    Config {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Directory creation, open, read, write, or rename failure while copying.
    #[error("copy failed at {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removal failure during the delete phase.
    #[error("delete failed at {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking task panicked, was cancelled, or the runtime could not
    /// be built.
    #[error("task failed: {0}")]
    Task(String),
}

/// Convenience constructor for [`SyncError::Scan`].
pub(crate) fn scan_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Scan {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Copy`].
pub(crate) fn copy_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Copy {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Delete`].
pub(crate) fn delete_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Delete {
        path: path.into(),
        source,
    }
}
