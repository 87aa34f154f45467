//! Scan-json command - Split a legacy scan JSON document

use std::path::PathBuf;

use anyhow::{Context, Result};
use bdiosplit_core::{ScanJsonSplitter, DEFAULT_SCAN_SPLIT_STEP};
use clap::Args;

use crate::progress::{counted, finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the scan-json command
#[derive(Args, Debug)]
pub struct ScanJsonArgs {
    /// Scan JSON document with a `scanNodeList`
    file: PathBuf,

    /// Scan nodes per output document
    #[arg(long, default_value_t = DEFAULT_SCAN_SPLIT_STEP)]
    step: usize,
}

/// Execute the scan-json command
pub fn execute(args: ScanJsonArgs, global: GlobalOptions) -> Result<()> {
    if !args.file.is_file() {
        anyhow::bail!("Scan file not found: {}", args.file.display());
    }

    let splitter = ScanJsonSplitter::new(args.step).context("Invalid step")?;

    let pb = spinner("Splitting scan document...", global.quiet);
    let written = splitter
        .split_file(&args.file)
        .with_context(|| format!("Failed to split {}", args.file.display()))?;
    finish_spinner(pb, &format!("Wrote {}", counted(written.len(), "document")));

    if !global.quiet {
        for path in &written {
            println!("{}", path.display());
        }
    }

    Ok(())
}
