//! `charmsync mirror` — reconcile one arbitrary directory pair.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use charmsync_sync::SyncJob;

use super::{print_report, SyncOptions};

/// Arguments for `charmsync mirror`.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Directory to mirror from.
    pub source: PathBuf,

    /// Directory to mirror into; created if missing.
    pub destination: PathBuf,

    /// Regex matched against root-relative paths; repeatable.
    #[arg(long = "exclude", value_name = "REGEX")]
    pub excludes: Vec<String>,

    #[command(flatten)]
    pub options: SyncOptions,
}

impl MirrorArgs {
    pub fn run(self) -> Result<()> {
        let report = SyncJob::new(&self.source, &self.destination)
            .excludes(&self.excludes)
            .mode(self.options.mode())
            .deadline(self.options.deadline())
            .dry_run(self.options.dry_run)
            .run_blocking()
            .with_context(|| {
                format!(
                    "mirror failed: {} → {}",
                    self.source.display(),
                    self.destination.display()
                )
            })?;
        print_report(&report);
        Ok(())
    }
}
