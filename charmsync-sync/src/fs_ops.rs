//! Filesystem primitives the reconciler delegates to.
//!
//! ## `LocalFs::copy_file` — 4-step protocol
//!
//! 1. Create a uniquely named `.charmsync-*.tmp` file beside `<dst>`.
//! 2. Stream the source content into it and apply the source permission bits.
//! 3. Rename it over `<dst>` (atomic on POSIX).
//! 4. On any failure the temporary file is removed and `<dst>` is untouched.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Prefix of the temporary sibling a copy is staged in before the rename.
pub const TMP_PREFIX: &str = ".charmsync-";

/// Primitives consumed by [`crate::reconcile::Reconciler`].
pub trait FileOps {
    /// Copy full content and permission bits, creating or replacing `dst`.
    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()>;

    /// Whether anything (including a dangling symlink) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or symlink without following it.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Entry names directly inside `path`.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// `Some(true)` for a real directory, `Some(false)` for anything else,
    /// `None` when nothing is there. Never follows symlinks.
    fn is_real_dir(&self, path: &Path) -> io::Result<Option<bool>>;
}

/// [`FileOps`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileOps for LocalFs {
    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        copy_with_tmp(src, dst)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            names.push(PathBuf::from(entry?.file_name()));
        }
        names.sort();
        Ok(names)
    }

    fn is_real_dir(&self, path: &Path) -> io::Result<Option<bool>> {
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(meta.is_dir())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn copy_with_tmp(src: &Path, dst: &Path) -> io::Result<()> {
    let parent = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut input = File::open(src)?;
    let permissions = input.metadata()?.permissions();

    // Dropping `staged` on any early return deletes the temporary file.
    let mut staged = tempfile::Builder::new()
        .prefix(TMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(parent)?;
    io::copy(&mut input, staged.as_file_mut())?;
    staged.as_file().set_permissions(permissions)?;
    staged.persist(dst).map_err(|e| e.error)?;
    Ok(())
}
