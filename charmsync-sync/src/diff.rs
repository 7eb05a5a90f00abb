//! Snapshot comparison.
//!
//! Classification rules, applied to every key in either snapshot:
//!
//! 1. In both, destination is a directory or symlink → `skip`.
//! 2. In both, both regular files → `update` if content (or size, in
//!    size-only mode) differs, else `skip`.
//! 3. In both, destination is a regular file but source is not → `update`
//!    (kind change; the reconciler clears the stale file).
//! 4. Destination only → `delete`.
//! 5. Source only → `create`, unless some ancestor of the key is a symlink
//!    in the destination; writing there would land outside the tree, so the
//!    key is `skip`ped.
//!
//! Modification times never take part.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use charmsync_core::FingerprintMode;

use crate::snapshot::{PathEntry, TreeSnapshot};

/// Partition of the key union of two snapshots into four disjoint sets.
///
/// `create` and `update` keep the source entry so the reconciler knows what
/// kind of thing it is materializing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSet {
    pub delete: BTreeSet<PathBuf>,
    pub create: BTreeMap<PathBuf, PathEntry>,
    pub update: BTreeMap<PathBuf, PathEntry>,
    pub skip: BTreeSet<PathBuf>,
}

impl OperationSet {
    /// True when applying the set would change nothing.
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty() && self.create.is_empty() && self.update.is_empty()
    }

    /// Total number of classified keys.
    pub fn len(&self) -> usize {
        self.delete.len() + self.create.len() + self.update.len() + self.skip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compare `source` against `destination`.
pub fn diff(
    source: &TreeSnapshot,
    destination: &TreeSnapshot,
    mode: FingerprintMode,
) -> OperationSet {
    let mut ops = OperationSet::default();

    for (key, src) in source.iter() {
        let Some(dst) = destination.get(key) else {
            if under_destination_symlink(destination, key) {
                tracing::warn!(path = %key.display(), "destination ancestor is a symlink; skipping");
                ops.skip.insert(key.clone());
            } else {
                ops.create.insert(key.clone(), src.clone());
            }
            continue;
        };

        if dst.is_dir || dst.is_symlink {
            ops.skip.insert(key.clone());
        } else if !src.is_regular_file() || differs(src, dst, mode) {
            ops.update.insert(key.clone(), src.clone());
        } else {
            ops.skip.insert(key.clone());
        }
    }

    for key in destination.keys() {
        if !source.contains(key) {
            ops.delete.insert(key.clone());
        }
    }

    tracing::debug!(
        delete = ops.delete.len(),
        create = ops.create.len(),
        update = ops.update.len(),
        skip = ops.skip.len(),
        "computed operation set"
    );
    ops
}

fn under_destination_symlink(destination: &TreeSnapshot, key: &Path) -> bool {
    key.ancestors()
        .skip(1)
        .any(|ancestor| destination.get(ancestor).is_some_and(|e| e.is_symlink))
}

fn differs(src: &PathEntry, dst: &PathEntry, mode: FingerprintMode) -> bool {
    match mode {
        FingerprintMode::ContentHash => src.fingerprint != dst.fingerprint,
        FingerprintMode::SizeOnly => src.size != dst.size,
    }
}
