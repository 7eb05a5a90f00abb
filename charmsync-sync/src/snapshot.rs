//! In-memory tree snapshots.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::fingerprint::Fingerprint;

/// Metadata recorded for one entry below a tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub is_dir: bool,
    pub is_symlink: bool,
    pub size: u64,
    /// Informational only; never consulted when classifying.
    pub modified: Option<DateTime<Utc>>,
    /// Present only for regular files scanned with content hashing.
    pub fingerprint: Option<Fingerprint>,
}

impl PathEntry {
    /// A regular file is neither a directory nor a symlink.
    pub fn is_regular_file(&self) -> bool {
        !self.is_dir && !self.is_symlink
    }

    pub fn file(size: u64, fingerprint: Option<Fingerprint>) -> Self {
        Self {
            is_dir: false,
            is_symlink: false,
            size,
            modified: None,
            fingerprint,
        }
    }

    pub fn dir() -> Self {
        Self {
            is_dir: true,
            is_symlink: false,
            size: 0,
            modified: None,
            fingerprint: None,
        }
    }

    pub fn symlink() -> Self {
        Self {
            is_dir: false,
            is_symlink: true,
            size: 0,
            modified: None,
            fingerprint: None,
        }
    }
}

/// Immutable map from root-relative path to [`PathEntry`].
///
/// Only ever built whole: a scan that fails yields no snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    entries: BTreeMap<PathBuf, PathEntry>,
}

impl TreeSnapshot {
    pub fn get(&self, relative: &Path) -> Option<&PathEntry> {
        self.entries.get(relative)
    }

    pub fn contains(&self, relative: &Path) -> bool {
        self.entries.contains_key(relative)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &PathEntry)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.keys()
    }
}

impl FromIterator<(PathBuf, PathEntry)> for TreeSnapshot {
    fn from_iter<T: IntoIterator<Item = (PathBuf, PathEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
