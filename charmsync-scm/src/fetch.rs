//! Fetching every repository a manifest names.

use std::path::Path;

use charmsync_core::{Manifest, ScmKind};

use crate::bzr::BzrScm;
use crate::error::ScmError;
use crate::git::GitScm;
use crate::repository::{Checkout, ScmHandler};

/// Role of a repository within a charm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Upstream,
    Development,
    Dependency,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FetchStage::Upstream => "upstream",
            FetchStage::Development => "development",
            FetchStage::Dependency => "dependency",
        })
    }
}

/// One repository to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStep {
    pub stage: FetchStage,
    pub scm: ScmKind,
    pub checkout: Checkout,
}

/// Build the handler for `scm`, resolving its executable on `PATH`.
pub fn handler_for(scm: ScmKind, checkout: Checkout) -> Result<Box<dyn ScmHandler>, ScmError> {
    let handler: Box<dyn ScmHandler> = match scm {
        ScmKind::Git => Box::new(GitScm::new(checkout)?),
        ScmKind::Bazaar => Box::new(BzrScm::new(checkout)?),
    };
    Ok(handler)
}

/// Ordered fetch steps: upstream (bzr, latest revision) into the staging
/// dir, the development repository into `workdir`, then every dependency
/// into the dependencies dir. An empty upstream is skipped.
pub fn fetch_plan(manifest: &Manifest, workdir: &Path) -> Vec<FetchStep> {
    let name = &manifest.repo.name.0;
    let mut steps = Vec::with_capacity(manifest.dependencies.len() + 2);

    if manifest.upstream.is_empty() {
        tracing::warn!(charm = %name, "manifest has no upstream; skipping upstream fetch");
    } else {
        steps.push(FetchStep {
            stage: FetchStage::Upstream,
            scm: ScmKind::Bazaar,
            checkout: Checkout::new(
                name.as_str(),
                manifest.upstream.as_str(),
                Manifest::staging_dir(workdir),
                "",
            ),
        });
    }

    steps.push(FetchStep {
        stage: FetchStage::Development,
        scm: manifest.repo.scm,
        checkout: Checkout::new(
            name.as_str(),
            manifest.repo.url.as_str(),
            workdir,
            manifest.repo.revision.as_str(),
        ),
    });

    let deps_dir = Manifest::deps_dir(workdir);
    for dep in &manifest.dependencies {
        steps.push(FetchStep {
            stage: FetchStage::Dependency,
            scm: dep.repo.scm,
            checkout: Checkout::new(
                dep.repo.name.0.as_str(),
                dep.repo.url.as_str(),
                &deps_dir,
                dep.repo.revision.as_str(),
            ),
        });
    }
    steps
}

/// Fetch every repository of `manifest` with the real VCS executables.
pub fn fetch_all(manifest: &Manifest, workdir: &Path) -> Result<(), ScmError> {
    fetch_with(manifest, workdir, handler_for)
}

/// Like [`fetch_all`] with a custom handler factory.
///
/// All handlers are built before the first update, so a missing executable
/// fails the fetch before anything is cloned.
pub fn fetch_with<F>(manifest: &Manifest, workdir: &Path, mut make: F) -> Result<(), ScmError>
where
    F: FnMut(ScmKind, Checkout) -> Result<Box<dyn ScmHandler>, ScmError>,
{
    let mut handlers = Vec::new();
    for step in fetch_plan(manifest, workdir) {
        handlers.push((step.stage, make(step.scm, step.checkout)?));
    }

    for (stage, handler) in handlers {
        tracing::info!(
            stage = %stage,
            repo = handler.name(),
            path = %handler.full_path().display(),
            "fetching repository"
        );
        handler.update()?;
    }
    Ok(())
}
