//! webassets — incremental web-asset extraction and synchronization CLI.
//!
//! # Usage
//!
//! ```text
//! webassets extract <source-root> <dest> [--include <pat>]... [--exclude <pat>]...
//!                   [--lib-dir <name>] [--cache-dir <dir>]
//! webassets sync <dest> --mappings <file.yaml> [--cache-dir <dir>] [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{extract::ExtractArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "webassets",
    version,
    about = "Extract and synchronize web assets incrementally",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract bundled asset modules into a target directory.
    Extract(ExtractArgs),

    /// Converge a target directory to match a mapping file.
    Sync(SyncArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => args.run(),
        Commands::Sync(args) => args.run(),
    }
}
