//! Inspect command - Scan graph statistics and partition plan

use std::path::PathBuf;

use anyhow::{Context, Result};
use bdiosplit_core::{CollectionSummary, Splitter};
use clap::Args;
use serde::Serialize;

use super::{load_config, split_options};
use crate::progress::{counted, finish_spinner, partition_bar, spinner};
use crate::GlobalOptions;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Directory holding the uncompressed BDIO shards
    #[arg(long = "input-dir", visible_alias = "in")]
    input_dir: PathBuf,

    /// Also compute the partitions a split would produce
    #[arg(long)]
    plan: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// One planned partition.
#[derive(Debug, Serialize)]
struct PlannedPartition {
    label: String,
    window_records: usize,
    backfilled: usize,
    records: usize,
    pages: usize,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    input_dir: PathBuf,
    shard_count: usize,
    #[serde(flatten)]
    summary: CollectionSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<Vec<PlannedPartition>>,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, None)?;

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    let splitter = Splitter::new(split_options(&config)).context("Invalid split options")?;
    let quiet = global.quiet || args.json;

    let pb = spinner("Loading scan graph...", quiet);
    let loaded = splitter
        .loader()
        .load(&args.input_dir)
        .with_context(|| format!("Failed to load {}", args.input_dir.display()))?;
    let summary =
        CollectionSummary::compute(&loaded.collection).context("Failed to summarize graph")?;
    finish_spinner(
        pb,
        &format!(
            "Loaded {} from {}",
            counted(loaded.collection.len(), "record"),
            counted(loaded.shard_count, "shard")
        ),
    );

    let plan = if args.plan {
        let plan = splitter
            .plan(&loaded.collection)
            .context("Failed to plan partitions")?;
        let page_limit = config.limits.max_page_nodes;

        let pb = partition_bar(plan.len(), "Closing partitions", quiet);
        let mut planned = Vec::with_capacity(plan.len());
        for partition in plan.iter() {
            let partition = partition.context("Failed to close partition")?;
            planned.push(PlannedPartition {
                pages: partition.len().div_ceil(page_limit),
                window_records: partition.window_len,
                backfilled: partition.backfilled(),
                records: partition.len(),
                label: partition.label,
            });
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
        finish_spinner(pb, &format!("Planned {}", counted(planned.len(), "partition")));
        Some(planned)
    } else {
        None
    };

    let output = InspectOutput {
        input_dir: args.input_dir,
        shard_count: loaded.shard_count,
        summary,
        plan,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Scan Graph: {}", output.input_dir.display());
    println!("  Shards:              {}", output.shard_count);
    println!("  Rooted records:      {}", output.summary.rooted_records);
    println!("  Unrooted records:    {}", output.summary.unrooted_records);
    println!("  Root-level records:  {}", output.summary.root_level_records);
    println!("  Payload bytes:       {}", output.summary.total_payload_bytes);
    println!("  Max depth:           {}", output.summary.max_depth);
    if output.summary.dangling_references > 0 {
        println!(
            "  Dangling references: {} (split will fail)",
            output.summary.dangling_references
        );
    }

    if let Some(plan) = &output.plan {
        println!();
        println!("Partition Plan ({} strategy):", config.partition.strategy);
        for p in plan {
            println!(
                "  {:<24} {:>8} window {:>8} backfilled {:>4} pages",
                p.label, p.window_records, p.backfilled, p.pages
            );
        }
    }

    Ok(())
}
