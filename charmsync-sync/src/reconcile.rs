//! Applying an [`OperationSet`] to the destination tree.
//!
//! Phases run strictly in order: delete, create, update. The first failure
//! aborts the run; nothing already applied is rolled back.
//!
//! Directories are never materialized on their own. Only ancestors of a
//! copied file are created, so a source directory with no files in it has
//! no counterpart in the destination.

use std::io;
use std::path::{Path, PathBuf};

use crate::diff::OperationSet;
use crate::error::{copy_err, delete_err, SyncError};
use crate::exclude::ExclusionMatcher;
use crate::fs_ops::{FileOps, LocalFs};

/// Kind of filesystem change performed (or planned, in dry-run mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Delete,
    Create,
    Update,
}

/// One applied operation, keyed by root-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOp {
    pub kind: OpKind,
    pub path: PathBuf,
}

/// Applies operation sets through a [`FileOps`] implementation.
pub struct Reconciler<'a, F: FileOps = LocalFs> {
    fs: F,
    matcher: &'a ExclusionMatcher,
    dry_run: bool,
}

impl<'a> Reconciler<'a, LocalFs> {
    pub fn new(matcher: &'a ExclusionMatcher) -> Self {
        Self::with_fs(LocalFs, matcher)
    }
}

impl<'a, F: FileOps> Reconciler<'a, F> {
    /// `matcher` must be the one the snapshots were built with; the delete
    /// phase uses it to leave excluded content inside removed directories.
    pub fn with_fs(fs: F, matcher: &'a ExclusionMatcher) -> Self {
        Self {
            fs,
            matcher,
            dry_run: false,
        }
    }

    /// Log and report operations without touching the filesystem.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Apply `ops` from `source_root` onto `destination_root`.
    pub fn apply(
        &self,
        ops: &OperationSet,
        source_root: &Path,
        destination_root: &Path,
    ) -> Result<Vec<AppliedOp>, SyncError> {
        let mut applied = Vec::new();

        // Phase 1: delete. Kind-changed updates lose their stale file here so
        // the create phase can build directories in its place.
        for key in &ops.delete {
            let target = destination_root.join(key);
            if self.dry_run {
                tracing::info!(path = %target.display(), "[dry-run] would delete");
            } else {
                tracing::info!(path = %target.display(), "deleting");
                self.remove_tree(&target, key)?;
            }
            applied.push(AppliedOp {
                kind: OpKind::Delete,
                path: key.clone(),
            });
        }
        for (key, entry) in &ops.update {
            if entry.is_regular_file() {
                continue;
            }
            let target = destination_root.join(key);
            if self.dry_run {
                tracing::info!(path = %target.display(), "[dry-run] would replace stale file");
            } else {
                tracing::info!(path = %target.display(), "removing file replaced by directory or symlink");
                self.remove_file(&target)?;
            }
            applied.push(AppliedOp {
                kind: OpKind::Update,
                path: key.clone(),
            });
        }

        // Phase 2: create.
        for (key, entry) in &ops.create {
            if !entry.is_regular_file() {
                tracing::debug!(path = %key.display(), "not materializing non-file entry");
                continue;
            }
            self.copy(source_root, destination_root, key)?;
            applied.push(AppliedOp {
                kind: OpKind::Create,
                path: key.clone(),
            });
        }

        // Phase 3: update.
        for (key, entry) in &ops.update {
            if !entry.is_regular_file() {
                continue;
            }
            self.copy(source_root, destination_root, key)?;
            applied.push(AppliedOp {
                kind: OpKind::Update,
                path: key.clone(),
            });
        }

        Ok(applied)
    }

    fn copy(&self, source_root: &Path, destination_root: &Path, key: &Path) -> Result<(), SyncError> {
        let src = source_root.join(key);
        let dst = destination_root.join(key);
        if self.dry_run {
            tracing::info!(from = %src.display(), to = %dst.display(), "[dry-run] would copy");
            return Ok(());
        }

        self.check_ancestors(destination_root, key)?;
        if let Some(parent) = dst.parent() {
            if !self.fs.exists(parent) {
                self.fs
                    .create_dir_all(parent)
                    .map_err(|e| copy_err(parent, e))?;
            }
        }
        tracing::info!(from = %src.display(), to = %dst.display(), "copying");
        self.fs.copy_file(&src, &dst).map_err(|e| copy_err(&dst, e))
    }

    /// Refuse to write through an existing ancestor of `key` that is not a
    /// real directory; a symlink there would redirect the copy outside
    /// `destination_root`.
    fn check_ancestors(&self, destination_root: &Path, key: &Path) -> Result<(), SyncError> {
        let Some(parent) = key.parent() else {
            return Ok(());
        };
        let mut current = destination_root.to_path_buf();
        for component in parent.components() {
            current.push(component);
            match self.fs.is_real_dir(&current).map_err(|e| copy_err(&current, e))? {
                Some(true) => {}
                // Nothing further down exists yet; create_dir_all builds it.
                None => return Ok(()),
                Some(false) => {
                    return Err(copy_err(
                        &current,
                        io::Error::other("destination ancestor is not a directory"),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Remove `target` (relative path `relative`) and everything below it
    /// except excluded entries. Returns whether `target` is fully gone.
    fn remove_tree(&self, target: &Path, relative: &Path) -> Result<bool, SyncError> {
        match self.fs.is_real_dir(target).map_err(|e| delete_err(target, e))? {
            // An ancestor earlier in the delete set already took it.
            None => Ok(true),
            Some(false) => {
                self.remove_file(target)?;
                Ok(true)
            }
            Some(true) => {
                let mut complete = true;
                let children = self.fs.read_dir(target).map_err(|e| delete_err(target, e))?;
                for name in children {
                    let child_rel = relative.join(&name);
                    if self.matcher.is_excluded(&child_rel) {
                        tracing::debug!(path = %child_rel.display(), "keeping excluded entry");
                        complete = false;
                        continue;
                    }
                    complete &= self.remove_tree(&target.join(&name), &child_rel)?;
                }
                if complete {
                    match self.fs.remove_dir(target) {
                        Ok(()) => {}
                        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                        Err(e) => return Err(delete_err(target, e)),
                    }
                }
                Ok(complete)
            }
        }
    }

    fn remove_file(&self, target: &Path) -> Result<(), SyncError> {
        match self.fs.remove_file(target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(delete_err(target, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::scanner::scan;
    use charmsync_core::FingerprintMode;
    use crate::snapshot::PathEntry;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// LocalFs that fails chosen copies or removals and logs the copies.
    #[derive(Default)]
    struct FlakyFs {
        fail_copy: Option<PathBuf>,
        fail_remove: Option<PathBuf>,
        copies: Rc<RefCell<Vec<PathBuf>>>,
    }

    fn injected() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "injected")
    }

    impl FileOps for FlakyFs {
        fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
            if self.fail_copy.as_deref() == Some(dst) {
                return Err(injected());
            }
            self.copies.borrow_mut().push(dst.to_path_buf());
            LocalFs.copy_file(src, dst)
        }
        fn exists(&self, path: &Path) -> bool {
            LocalFs.exists(path)
        }
        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            LocalFs.create_dir_all(path)
        }
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            if self.fail_remove.as_deref() == Some(path) {
                return Err(injected());
            }
            LocalFs.remove_file(path)
        }
        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            if self.fail_remove.as_deref() == Some(path) {
                return Err(injected());
            }
            LocalFs.remove_dir(path)
        }
        fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
            LocalFs.read_dir(path)
        }
        fn is_real_dir(&self, path: &Path) -> io::Result<Option<bool>> {
            LocalFs.is_real_dir(path)
        }
    }

    fn plan(src: &Path, dst: &Path, matcher: &ExclusionMatcher) -> OperationSet {
        let a = scan(src, matcher, FingerprintMode::ContentHash).unwrap();
        let b = scan(dst, matcher, FingerprintMode::ContentHash).unwrap();
        diff(&a, &b, FingerprintMode::ContentHash)
    }

    #[test]
    fn creates_parent_chain_for_nested_file() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("hooks/lib")).unwrap();
        fs::write(src.path().join("hooks/lib/util.py"), "pass").unwrap();

        let matcher = ExclusionMatcher::empty();
        let ops = plan(src.path(), dst.path(), &matcher);
        let applied = Reconciler::new(&matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap();

        assert_eq!(
            fs::read_to_string(dst.path().join("hooks/lib/util.py")).unwrap(),
            "pass"
        );
        assert_eq!(
            applied,
            vec![AppliedOp {
                kind: OpKind::Create,
                path: PathBuf::from("hooks/lib/util.py")
            }]
        );
    }

    #[test]
    fn empty_source_directory_is_not_materialized() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("empty")).unwrap();

        let matcher = ExclusionMatcher::empty();
        let ops = plan(src.path(), dst.path(), &matcher);
        assert!(ops.create.contains_key(Path::new("empty")));
        let applied = Reconciler::new(&matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap();
        assert!(applied.is_empty());
        assert!(!dst.path().join("empty").exists());
    }

    #[test]
    fn nested_deletes_tolerate_already_removed_children() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(dst.path().join("old/deeper")).unwrap();
        fs::write(dst.path().join("old/deeper/x.txt"), "x").unwrap();
        fs::write(dst.path().join("old/y.txt"), "y").unwrap();

        let matcher = ExclusionMatcher::empty();
        let ops = plan(src.path(), dst.path(), &matcher);
        assert_eq!(ops.delete.len(), 4);
        Reconciler::new(&matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap();
        assert!(!dst.path().join("old").exists());
    }

    #[test]
    fn deleting_directory_keeps_excluded_content() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(dst.path().join("vendored/.git")).unwrap();
        fs::write(dst.path().join("vendored/.git/HEAD"), "ref").unwrap();
        fs::write(dst.path().join("vendored/lib.py"), "lib").unwrap();

        let matcher = ExclusionMatcher::build([r".*\.git.*"]).unwrap();
        let ops = plan(src.path(), dst.path(), &matcher);
        Reconciler::new(&matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap();

        assert!(!dst.path().join("vendored/lib.py").exists());
        assert!(dst.path().join("vendored/.git/HEAD").exists());
    }

    #[test]
    fn file_replaced_by_directory_in_source() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("conf")).unwrap();
        fs::write(src.path().join("conf/app.ini"), "[app]").unwrap();
        fs::write(dst.path().join("conf"), "used to be a file").unwrap();

        let matcher = ExclusionMatcher::empty();
        let ops = plan(src.path(), dst.path(), &matcher);
        Reconciler::new(&matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap();

        assert!(dst.path().join("conf").is_dir());
        assert_eq!(
            fs::read_to_string(dst.path().join("conf/app.ini")).unwrap(),
            "[app]"
        );
    }

    #[test]
    fn dry_run_touches_nothing() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("new.txt"), "n").unwrap();
        fs::write(dst.path().join("stale.txt"), "s").unwrap();

        let matcher = ExclusionMatcher::empty();
        let ops = plan(src.path(), dst.path(), &matcher);
        let applied = Reconciler::new(&matcher)
            .dry_run(true)
            .apply(&ops, src.path(), dst.path())
            .unwrap();

        assert_eq!(applied.len(), 2);
        assert!(dst.path().join("stale.txt").exists());
        assert!(!dst.path().join("new.txt").exists());
    }

    #[test]
    fn first_copy_failure_aborts_remaining_phases() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("a.txt"), "new a").unwrap();
        fs::write(src.path().join("b.txt"), "new b").unwrap();
        fs::write(src.path().join("c.txt"), "v2").unwrap();
        fs::write(dst.path().join("c.txt"), "v1").unwrap();
        fs::write(dst.path().join("stale.txt"), "s").unwrap();

        let matcher = ExclusionMatcher::empty();
        let ops = plan(src.path(), dst.path(), &matcher);
        let flaky = FlakyFs {
            fail_copy: Some(dst.path().join("a.txt")),
            ..FlakyFs::default()
        };
        let err = Reconciler::with_fs(flaky, &matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap_err();

        match err {
            SyncError::Copy { path, source } => {
                assert_eq!(path, dst.path().join("a.txt"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected copy error, got {other:?}"),
        }
        // Deletes ran before the failure; nothing after it did.
        assert!(!dst.path().join("stale.txt").exists());
        assert!(!dst.path().join("b.txt").exists());
        assert_eq!(fs::read_to_string(dst.path().join("c.txt")).unwrap(), "v1");
    }

    #[test]
    fn delete_failure_stops_before_any_copy() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("new.txt"), "n").unwrap();
        fs::write(src.path().join("c.txt"), "v2").unwrap();
        fs::write(dst.path().join("c.txt"), "v1").unwrap();
        fs::write(dst.path().join("locked.txt"), "l").unwrap();

        let matcher = ExclusionMatcher::empty();
        let ops = plan(src.path(), dst.path(), &matcher);
        let copies = Rc::new(RefCell::new(Vec::new()));
        let flaky = FlakyFs {
            fail_remove: Some(dst.path().join("locked.txt")),
            copies: Rc::clone(&copies),
            ..FlakyFs::default()
        };
        let err = Reconciler::with_fs(flaky, &matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap_err();

        match err {
            SyncError::Delete { path, source } => {
                assert_eq!(path, dst.path().join("locked.txt"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected delete error, got {other:?}"),
        }
        assert!(copies.borrow().is_empty());
        assert!(!dst.path().join("new.txt").exists());
        assert_eq!(fs::read_to_string(dst.path().join("c.txt")).unwrap(), "v1");
    }

    #[test]
    #[cfg(unix)]
    fn copy_refuses_to_follow_symlinked_ancestor() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("a")).unwrap();
        fs::write(src.path().join("a/b.txt"), "payload").unwrap();
        std::os::unix::fs::symlink(outside.path(), dst.path().join("a")).unwrap();

        // A plan built before the link appeared still lists the file as new.
        let mut ops = OperationSet::default();
        ops.create.insert(
            PathBuf::from("a/b.txt"),
            PathEntry::file(7, None),
        );
        let matcher = ExclusionMatcher::empty();
        let err = Reconciler::new(&matcher)
            .apply(&ops, src.path(), dst.path())
            .unwrap_err();

        match err {
            SyncError::Copy { path, .. } => assert_eq!(path, dst.path().join("a")),
            other => panic!("expected copy error, got {other:?}"),
        }
        assert!(!outside.path().join("b.txt").exists());
    }
}
