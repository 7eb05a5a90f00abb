//! `charmsync run` — fetch, then sync.

use anyhow::Result;
use clap::Args;

use super::{fetch::fetch, sync::sync, SyncOptions, WorkdirArg};

/// Arguments for `charmsync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub workdir: WorkdirArg,

    #[command(flatten)]
    pub options: SyncOptions,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let workdir = self.workdir.resolve()?;
        fetch(&workdir)?;
        sync(&workdir, &self.options)
    }
}
