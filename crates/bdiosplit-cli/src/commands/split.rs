//! Split command - Partition a scan graph directory

use std::path::PathBuf;

use anyhow::{Context, Result};
use bdiosplit_config::{ConfigOverrides, PartitionStrategy};
use bdiosplit_core::{PartitionSummary, Splitter};
use clap::Args;

use super::{load_config, print_info, split_options};
use crate::progress::{counted, finish_spinner, report_partition, spinner};
use crate::GlobalOptions;

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Directory holding the uncompressed BDIO shards
    #[arg(long = "input-dir", visible_alias = "in")]
    input_dir: PathBuf,

    /// Directory to write partitions into
    #[arg(long = "output-dir", visible_alias = "out")]
    output_dir: PathBuf,

    /// Maximum records per partition window
    #[arg(long = "max-file-entries", visible_alias = "max-partition-nodes")]
    max_file_entries: Option<usize>,

    /// Maximum records per entry document
    #[arg(long = "max-chunk-nodes", visible_alias = "max-page-nodes")]
    max_chunk_nodes: Option<usize>,

    /// Records in the first window (default: twice --max-chunk-nodes)
    #[arg(long)]
    first_window_nodes: Option<usize>,

    /// Windowing strategy (count, size)
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<PartitionStrategy>,

    /// Maximum payload bytes per window (size strategy)
    #[arg(long)]
    max_file_bytes: Option<u64>,

    /// Project name written into every partition
    #[arg(long)]
    project_name: Option<String>,

    /// Project version written into every partition
    #[arg(long)]
    project_version: Option<String>,

    /// Close and write partitions in parallel
    #[arg(long)]
    parallel: bool,
}

/// Parse a partition strategy from string
fn parse_strategy(s: &str) -> Result<PartitionStrategy, String> {
    s.parse()
        .map_err(|e: bdiosplit_config::ConfigError| e.to_string())
}

impl SplitArgs {
    /// Convert split arguments to config overrides
    fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_partition_nodes: self.max_file_entries,
            max_page_nodes: self.max_chunk_nodes,
            first_window_nodes: self.first_window_nodes,
            max_partition_bytes: self.max_file_bytes,
            strategy: self.strategy,
            parallel: self.parallel,
            project_name: self.project_name.clone(),
            project_version: self.project_version.clone(),
            log_level: None,
        }
    }
}

/// Execute the split command
pub fn execute(args: SplitArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, Some(&args.to_config_overrides()))?;

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    let splitter = Splitter::new(split_options(&config)).context("Invalid split options")?;

    print_info(
        &format!(
            "Splitting {} ({} strategy, {} nodes per partition, {} per page)",
            args.input_dir.display(),
            config.partition.strategy,
            config.limits.max_partition_nodes,
            config.limits.max_page_nodes
        ),
        global.quiet,
    );

    let pb = spinner("Loading scan graph...", global.quiet);
    let on_partition = |summary: &PartitionSummary| report_partition(&pb, summary);

    let report = splitter
        .run_with(&args.input_dir, &args.output_dir, &on_partition)
        .with_context(|| format!("Failed to split {}", args.input_dir.display()))?;

    finish_spinner(
        pb,
        &format!(
            "Wrote {} to {}",
            counted(report.partitions.len(), "partition"),
            args.output_dir.display()
        ),
    );

    if !global.quiet {
        println!();
        println!("Split Summary:");
        println!("  Shards read:       {}", report.shard_count);
        println!("  Rooted records:    {}", report.rooted_records);
        println!("  Unrooted records:  {}", report.unrooted_records);
        println!("  Partitions:        {}", report.partitions.len());
        println!("  Pages:             {}", report.total_pages());
        println!("  Backfilled:        {}", report.total_backfilled());

        if global.verbose {
            println!();
            for p in &report.partitions {
                println!(
                    "  {:<24} {:>8} window {:>8} backfilled {:>4} pages  {}",
                    p.label, p.window_records, p.backfilled, p.pages, p.header_id
                );
            }
        }
    }

    Ok(())
}
