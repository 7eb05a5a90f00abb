//! `charmsync sync` — mirror the development tree and dependency resources
//! into the staged charm.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use charmsync_core::Manifest;
use charmsync_sync::run_plan;

use super::{print_report, SyncOptions, WorkdirArg};

/// Arguments for `charmsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub workdir: WorkdirArg,

    #[command(flatten)]
    pub options: SyncOptions,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let workdir = self.workdir.resolve()?;
        sync(&workdir, &self.options)
    }
}

pub(crate) fn sync(workdir: &Path, options: &SyncOptions) -> Result<()> {
    let manifest = Manifest::load_at(workdir)
        .with_context(|| format!("failed to load manifest in {}", workdir.display()))?;
    let plan = manifest.sync_plan(workdir);
    let reports = run_plan(&plan, options.plan_options())
        .with_context(|| format!("sync failed for '{}'", manifest.repo.name))?;
    for report in &reports {
        print_report(report);
    }
    Ok(())
}
