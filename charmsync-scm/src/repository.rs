//! Checkout lifecycle shared by every VCS.
//!
//! ## `Repository::update` — 4-step protocol
//!
//! 1. Create the work dir if missing.
//! 2. Checkout absent → clone it.
//! 3. Checkout present → require a clean working tree, else `Dirty`.
//! 4. Run the VCS's revision steps in order.

use std::ffi::OsString;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::command::run;
use crate::error::{io_err, ScmError};

/// Where a repository comes from and where it is checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub name: String,
    pub url: String,
    pub workdir: PathBuf,
    /// Empty means the latest revision.
    pub revision: String,
}

impl Checkout {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        workdir: impl Into<PathBuf>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            workdir: workdir.into(),
            revision: revision.into(),
        }
    }

    /// `<workdir>/<name>`.
    pub fn full_path(&self) -> PathBuf {
        self.workdir.join(&self.name)
    }
}

/// Command lines a VCS needs for the update protocol.
pub trait Vcs {
    /// Executable looked up on `PATH`.
    const BINARY: &'static str;

    fn clone_args(checkout: &Checkout) -> Vec<OsString>;

    /// Prints nothing on stdout for a clean tree.
    fn status_args(checkout: &Checkout) -> Vec<OsString>;

    fn revision_steps(checkout: &Checkout) -> Vec<Vec<OsString>>;
}

/// A fetchable repository.
pub trait ScmHandler {
    fn name(&self) -> &str;

    fn full_path(&self) -> PathBuf;

    /// Bring the checkout to the configured revision.
    fn update(&self) -> Result<(), ScmError>;
}

/// [`ScmHandler`] driving the executable of `V`.
#[derive(Debug, Clone)]
pub struct Repository<V> {
    checkout: Checkout,
    binary: PathBuf,
    _vcs: PhantomData<V>,
}

impl<V: Vcs> Repository<V> {
    /// Resolve `V::BINARY` on `PATH`.
    pub fn new(checkout: Checkout) -> Result<Self, ScmError> {
        let binary = which::which(V::BINARY).map_err(|source| ScmError::BinaryNotFound {
            binary: V::BINARY,
            source,
        })?;
        Ok(Self::with_binary(checkout, binary))
    }

    /// Use an explicit executable instead of searching `PATH`.
    pub fn with_binary(checkout: Checkout, binary: impl Into<PathBuf>) -> Self {
        Self {
            checkout,
            binary: binary.into(),
            _vcs: PhantomData,
        }
    }

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn is_clean(&self) -> Result<bool, ScmError> {
        let output = run(&self.binary, &V::status_args(&self.checkout))?;
        Ok(output.stdout.trim().is_empty())
    }
}

impl<V: Vcs> ScmHandler for Repository<V> {
    fn name(&self) -> &str {
        &self.checkout.name
    }

    fn full_path(&self) -> PathBuf {
        self.checkout.full_path()
    }

    fn update(&self) -> Result<(), ScmError> {
        let path = self.full_path();
        tracing::info!(repo = %path.display(), scm = V::BINARY, "updating repository");

        let workdir = &self.checkout.workdir;
        if !workdir.exists() {
            fs::create_dir_all(workdir).map_err(|e| io_err(workdir, e))?;
        }

        if path.exists() {
            if !self.is_clean()? {
                return Err(ScmError::Dirty { path });
            }
        } else {
            run(&self.binary, &V::clone_args(&self.checkout))?;
        }

        for step in V::revision_steps(&self.checkout) {
            run(&self.binary, &step)?;
        }
        Ok(())
    }
}
