//! CLI command implementations

pub mod check;
pub mod inspect;
pub mod scan_json;
pub mod split;

use anyhow::{Context, Result};
use bdiosplit_config::{ConfigLoader, ConfigOverrides, PartitionStrategy, SplitConfig};
use bdiosplit_core::{OutputLayout, ProjectOverrides, SplitOptions, Strategy};
use tracing::Level;

use crate::GlobalOptions;

/// Load configuration: global file, then `--config`, then CLI overrides.
pub fn load_config(
    global: &GlobalOptions,
    overrides: Option<&ConfigOverrides>,
) -> Result<SplitConfig> {
    let mut loader = ConfigLoader::new();
    loader
        .load(global.config.as_deref(), overrides)
        .context("Failed to load configuration")
}

/// Log level from the config files, if they load and name a valid one.
pub fn configured_log_level(global: &GlobalOptions) -> Option<Level> {
    let config = ConfigLoader::new()
        .load(global.config.as_deref(), None)
        .ok()?;
    config.logging.level.parse().ok()
}

/// Output file naming from the `[output]` section.
pub fn output_layout(config: &SplitConfig) -> OutputLayout {
    OutputLayout {
        header_file: config.output.header_file.clone(),
        entry_prefix: config.output.entry_prefix.clone(),
        name_marker: config.output.name_marker.clone(),
    }
}

/// Translate merged configuration into split options.
pub fn split_options(config: &SplitConfig) -> SplitOptions {
    SplitOptions {
        strategy: match config.partition.strategy {
            PartitionStrategy::Count => Strategy::Count,
            PartitionStrategy::Size => Strategy::Size,
        },
        page_limit: config.limits.max_page_nodes,
        partition_limit: config.limits.max_partition_nodes,
        first_window: config.limits.first_window_nodes,
        max_partition_bytes: config.limits.max_partition_bytes,
        layout: output_layout(config),
        overrides: ProjectOverrides {
            name: config.project.name.clone(),
            version: config.project.version.clone(),
        },
        parallel: config.partition.parallel,
    }
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
