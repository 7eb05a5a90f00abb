//! charmsync — fetch a charm's repositories and mirror them into staging.
//!
//! # Usage
//!
//! ```text
//! charmsync fetch [--workdir <dir>]
//! charmsync sync  [--workdir <dir>] [--size-only] [--dry-run] [--timeout <secs>]
//! charmsync run   [--workdir <dir>] [--size-only] [--dry-run] [--timeout <secs>]
//! charmsync mirror <src> <dst> [--exclude <regex>]... [--size-only] [--dry-run] [--timeout <secs>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{fetch::FetchArgs, mirror::MirrorArgs, run::RunArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "charmsync",
    version,
    about = "Fetch charm repositories and mirror them into a staging branch",
    long_about = None,
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or update the upstream, development and dependency repositories.
    Fetch(FetchArgs),

    /// Mirror the development tree and dependency resources into staging.
    Sync(SyncArgs),

    /// Fetch, then sync.
    Run(RunArgs),

    /// Mirror one directory into another.
    Mirror(MirrorArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Fetch(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Run(args) => args.run(),
        Commands::Mirror(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
