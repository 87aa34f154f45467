//! bdiosplit CLI - Split oversized BDIO scan graphs
//!
//! A command-line interface for partitioning uncompressed BDIO scan output
//! into independently valid chunks, inspecting scan graphs and verifying
//! written partitions.
//!
//! # Usage
//!
//! ```bash
//! # Split a scan into partitions of at most 100000 nodes
//! bdiosplit split --in scan-bdio --out split-bdio
//!
//! # Show graph statistics and the partition plan
//! bdiosplit inspect --input-dir scan-bdio --plan
//!
//! # Verify every partition resolves its parent references
//! bdiosplit check split-bdio
//!
//! # Split a legacy scan JSON document
//! bdiosplit scan-json scan.json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod progress;

/// bdiosplit - Split BDIO scan graphs into self-contained partitions
#[derive(Parser, Debug)]
#[command(name = "bdiosplit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "BDIOSPLIT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a scan graph directory into partitions
    Split(commands::split::SplitArgs),

    /// Show scan graph statistics and the partition plan
    Inspect(commands::inspect::InspectArgs),

    /// Verify written partitions
    Check(commands::check::CheckArgs),

    /// Split a legacy single-file scan JSON document
    ScanJson(commands::scan_json::ScanJsonArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity, falling back to the configured level
    let log_level = if cli.global.quiet {
        Level::ERROR
    } else if cli.global.verbose {
        Level::DEBUG
    } else {
        commands::configured_log_level(&cli.global).unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Split(args) => commands::split::execute(args, cli.global),
        Commands::Inspect(args) => commands::inspect::execute(args, cli.global),
        Commands::Check(args) => commands::check::execute(args, cli.global),
        Commands::ScanJson(args) => commands::scan_json::execute(args, cli.global),
    }
}
