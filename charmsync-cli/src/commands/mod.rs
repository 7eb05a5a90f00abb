pub mod fetch;
pub mod mirror;
pub mod run;
pub mod sync;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use charmsync_core::FingerprintMode;
use charmsync_sync::{OpKind, PlanOptions, SyncReport, DEFAULT_SCAN_DEADLINE};

/// `--workdir`, shared by the manifest-driven commands.
#[derive(Args, Debug, Clone)]
pub struct WorkdirArg {
    /// Directory holding `charmsync.json` (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,
}

impl WorkdirArg {
    pub fn resolve(&self) -> Result<PathBuf> {
        match &self.workdir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("failed to get current working directory"),
        }
    }
}

/// Flags controlling how a mirror run compares and applies.
#[derive(Args, Debug, Clone)]
pub struct SyncOptions {
    /// Compare files by size only instead of by SHA-512 content hash.
    #[arg(long)]
    pub size_only: bool,

    /// Show what would change without touching the destination.
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds both tree scans may take together.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_SCAN_DEADLINE.as_secs())]
    pub timeout: u64,
}

impl SyncOptions {
    pub fn mode(&self) -> FingerprintMode {
        if self.size_only {
            FingerprintMode::SizeOnly
        } else {
            FingerprintMode::ContentHash
        }
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            dry_run: self.dry_run,
            deadline: self.deadline(),
            mode: self.size_only.then_some(FingerprintMode::SizeOnly),
        }
    }
}

pub fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} {} → {} ({} deleted, {} copied, {} unchanged)",
        "✓".green().bold(),
        report.source.display(),
        report.destination.display(),
        report.deleted(),
        report.copied(),
        report.unchanged()
    );

    for op in &report.applied {
        let marker = match op.kind {
            OpKind::Delete => "-".red(),
            OpKind::Create => "+".green(),
            OpKind::Update => "~".yellow(),
        };
        println!("{prefix}  {marker}  {}", op.path.display());
    }
}
