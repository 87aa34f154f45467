//! Check command - Verify written partitions

use std::path::PathBuf;

use anyhow::{Context, Result};
use bdiosplit_core::verify_output_dir;
use clap::Args;

use super::{load_config, output_layout};
use crate::progress::{counted, finish_spinner, finish_spinner_error, spinner};
use crate::GlobalOptions;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory holding the partition directories
    output_dir: PathBuf,

    /// Page limit to check against (default: configured max_page_nodes)
    #[arg(long = "max-chunk-nodes", visible_alias = "max-page-nodes")]
    max_chunk_nodes: Option<usize>,
}

/// Execute the check command
pub fn execute(args: CheckArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, None)?;
    let layout = output_layout(&config);
    let page_limit = args.max_chunk_nodes.unwrap_or(config.limits.max_page_nodes);

    if !args.output_dir.is_dir() {
        anyhow::bail!("Output directory not found: {}", args.output_dir.display());
    }

    let pb = spinner("Verifying partitions...", global.quiet);
    let reports = verify_output_dir(&args.output_dir, &layout, Some(page_limit))
        .with_context(|| format!("Failed to verify {}", args.output_dir.display()))?;

    if reports.is_empty() {
        finish_spinner_error(pb, "No partitions found");
        anyhow::bail!(
            "No partition directories found in {}",
            args.output_dir.display()
        );
    }

    let invalid: Vec<_> = reports.iter().filter(|r| !r.is_valid()).collect();
    let records: usize = reports.iter().map(|r| r.records).sum();

    if invalid.is_empty() {
        finish_spinner(
            pb,
            &format!(
                "{} verified ({})",
                counted(reports.len(), "partition"),
                counted(records, "record")
            ),
        );
    } else {
        finish_spinner_error(
            pb,
            &format!("{} of {} partitions invalid", invalid.len(), reports.len()),
        );
    }

    if !global.quiet && global.verbose {
        for r in &reports {
            println!(
                "  {:<32} {:>4} pages {:>8} records  {}",
                r.dir.display(),
                r.pages,
                r.records,
                if r.is_valid() { "ok" } else { "INVALID" }
            );
        }
    }

    for r in &invalid {
        eprintln!("{}:", r.dir.display());
        for problem in r.problems() {
            eprintln!("  - {}", problem);
        }
    }

    if !invalid.is_empty() {
        anyhow::bail!("{} partition(s) failed verification", invalid.len());
    }

    Ok(())
}
