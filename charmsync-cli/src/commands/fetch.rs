//! `charmsync fetch` — clone or update every repository in the manifest.

use anyhow::{Context, Result};
use clap::Args;

use charmsync_core::Manifest;

use super::WorkdirArg;

/// Arguments for `charmsync fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub workdir: WorkdirArg,
}

impl FetchArgs {
    pub fn run(self) -> Result<()> {
        let workdir = self.workdir.resolve()?;
        fetch(&workdir)
    }
}

pub(crate) fn fetch(workdir: &std::path::Path) -> Result<()> {
    let manifest = Manifest::load_at(workdir)
        .with_context(|| format!("failed to load manifest in {}", workdir.display()))?;
    charmsync_scm::fetch_all(&manifest, workdir)
        .with_context(|| format!("fetch failed for '{}'", manifest.repo.name))?;
    println!("✓ fetched '{}'", manifest.repo.name);
    Ok(())
}
