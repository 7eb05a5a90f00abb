//! Charm manifest loading and sync planning.
//!
//! # Working directory layout
//!
//! ```text
//! <workdir>/
//!   charmsync.json          (manifest)
//!   <name>/                 (development checkout)
//!   dependencies/<dep>/     (dependency checkouts)
//!   staging/<name>/         (upstream checkout, the sync destination)
//! ```
//!
//! Planning is pure: [`Manifest::sync_plan`] only joins paths, it never
//! touches the filesystem.

use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::types::{Dependency, FingerprintMode, Manifest, RepoSpec, ScmKind, SyncPair};

/// File name of the manifest inside the working directory.
pub const MANIFEST_FILE: &str = "charmsync.json";

/// Directory holding the upstream checkout, relative to the working directory.
pub const STAGING_DIR: &str = "staging";

/// Directory holding dependency checkouts, relative to the working directory.
pub const DEPS_DIR: &str = "dependencies";

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// `<workdir>/charmsync.json` — pure, no I/O.
pub fn manifest_path_at(workdir: &Path) -> PathBuf {
    workdir.join(MANIFEST_FILE)
}

impl Manifest {
    /// Load and validate `<workdir>/charmsync.json`.
    ///
    /// Returns `ManifestError::NotFound` if absent, `ManifestError::Parse`
    /// (with path context) if malformed, `ManifestError::Invalid` if a charm
    /// or dependency lacks a name or URL.
    pub fn load_at(workdir: &Path) -> Result<Self, ManifestError> {
        let path = manifest_path_at(workdir);
        if !path.exists() {
            return Err(ManifestError::NotFound { path });
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_json(&contents).map_err(|err| match err {
            ManifestError::Parse { source, .. } => ManifestError::Parse { path, source },
            other => other,
        })
    }

    /// Parse and validate a manifest document.
    pub fn from_json(contents: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest =
            serde_json::from_str(contents).map_err(|source| ManifestError::Parse {
                path: PathBuf::from(MANIFEST_FILE),
                source,
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        validate_repo(&self.repo)?;
        for dep in &self.dependencies {
            validate_repo(&dep.repo)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // 2. Directory helpers
    // -----------------------------------------------------------------------

    /// `<workdir>/staging`
    pub fn staging_dir(workdir: &Path) -> PathBuf {
        workdir.join(STAGING_DIR)
    }

    /// `<workdir>/dependencies`
    pub fn deps_dir(workdir: &Path) -> PathBuf {
        workdir.join(DEPS_DIR)
    }

    /// `<workdir>/<name>`, the development checkout.
    pub fn development_dir(&self, workdir: &Path) -> PathBuf {
        workdir.join(&self.repo.name.0)
    }

    /// `<workdir>/staging/<name>`, the upstream checkout everything lands in.
    pub fn staged_charm_dir(&self, workdir: &Path) -> PathBuf {
        Self::staging_dir(workdir).join(&self.repo.name.0)
    }

    /// `<workdir>/dependencies/<dep>`
    pub fn dependency_dir(workdir: &Path, dep: &Dependency) -> PathBuf {
        Self::deps_dir(workdir).join(&dep.repo.name.0)
    }

    // -----------------------------------------------------------------------
    // 3. Plan
    // -----------------------------------------------------------------------

    /// Ordered list of trees to reconcile: the development checkout into the
    /// staged charm first, then every dependency resource into its
    /// destination inside the staged charm.
    pub fn sync_plan(&self, workdir: &Path) -> Vec<SyncPair> {
        let staged = self.staged_charm_dir(workdir);
        let mut plan = vec![SyncPair {
            source: self.development_dir(workdir),
            destination: staged.clone(),
            excludes: default_excludes(self.repo.scm),
            mode: FingerprintMode::ContentHash,
        }];

        for dep in &self.dependencies {
            let checkout = Self::dependency_dir(workdir, dep);
            let destination = staged.join(&dep.destination);
            for resource in &dep.resources {
                plan.push(SyncPair {
                    source: checkout.join(resource),
                    destination: destination.join(resource),
                    excludes: default_excludes(dep.repo.scm),
                    mode: FingerprintMode::ContentHash,
                });
            }
        }
        plan
    }
}

/// Exclusion patterns that keep revision-control metadata out of a sync:
/// the repository's own metadata directory plus bzr's, since the staged
/// charm is always a bzr branch.
pub fn default_excludes(scm: ScmKind) -> Vec<String> {
    let own = format!(r".*\.{}.*", scm.as_str());
    let bzr = r".*\.bzr.*".to_string();
    if own == bzr {
        vec![own]
    } else {
        vec![own, bzr]
    }
}

fn validate_repo(repo: &RepoSpec) -> Result<(), ManifestError> {
    if repo.name.0.trim().is_empty() {
        return Err(ManifestError::Invalid {
            entry: repo.url.clone(),
            field: "name",
        });
    }
    if repo.url.trim().is_empty() {
        return Err(ManifestError::Invalid {
            entry: repo.name.0.clone(),
            field: "url",
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
