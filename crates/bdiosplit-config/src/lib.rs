//! bdiosplit Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.bdiosplit/config.toml`
//! - An explicit config file (`--config`)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → explicit file → CLI overrides.
//!
//! # Example TOML
//!
//! ```toml
//! [limits]
//! max_partition_nodes = 100000
//! max_page_nodes = 3000
//!
//! [partition]
//! strategy = "count"  # or "size"
//! parallel = false
//!
//! [project]
//! name = "my-project"
//! version = "1.0"
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};

/// Default maximum records per partition window.
pub const DEFAULT_MAX_PARTITION_NODES: usize = 100_000;

/// Default maximum records per entry document.
pub const DEFAULT_MAX_PAGE_NODES: usize = 3_000;

/// Log levels accepted in `[logging] level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Root configuration for bdiosplit.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SplitConfig {
    /// Partition and page size limits
    pub limits: LimitsConfig,

    /// Windowing policy
    pub partition: PartitionConfig,

    /// Output file naming
    pub output: OutputConfig,

    /// Project name/version overrides
    pub project: ProjectConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Size limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Records per partition window after the first
    pub max_partition_nodes: usize,

    /// Records per entry document
    pub max_page_nodes: usize,

    /// Records in the first window (defaults to twice `max_page_nodes`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_window_nodes: Option<usize>,

    /// Payload bytes per window, size strategy only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_partition_bytes: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_partition_nodes: DEFAULT_MAX_PARTITION_NODES,
            max_page_nodes: DEFAULT_MAX_PAGE_NODES,
            first_window_nodes: None,
            max_partition_bytes: None,
        }
    }
}

/// Windowing policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PartitionConfig {
    pub strategy: PartitionStrategy,

    /// Close and write partitions in parallel
    pub parallel: bool,
}

/// How records are grouped into windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartitionStrategy {
    /// Fixed record counts over parent-sorted records, with ancestor backfill (default)
    #[default]
    Count,
    /// Record and byte bounded windows in load order
    Size,
}

impl std::fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Size => write!(f, "size"),
        }
    }
}

impl std::str::FromStr for PartitionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "count" => Ok(Self::Count),
            "size" => Ok(Self::Size),
            _ => Err(ConfigError::invalid_value(
                "partition.strategy",
                format!("unknown strategy '{}'. Valid values: count, size", s),
            )),
        }
    }
}

/// Output file naming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Header document file name, in input and output
    pub header_file: String,

    /// Entry document file name prefix
    pub entry_prefix: String,

    /// Header name substring the partition label is spliced in front of
    pub name_marker: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            header_file: "bdio-header.jsonld".to_string(),
            entry_prefix: "bdio-entry-".to_string(),
            name_marker: " signature".to_string(),
        }
    }
}

/// Project name/version written into every partition.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// CLI overrides for configuration.
///
/// These take precedence over all config files.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_partition_nodes: Option<usize>,
    pub max_page_nodes: Option<usize>,
    pub first_window_nodes: Option<usize>,
    pub max_partition_bytes: Option<u64>,
    pub strategy: Option<PartitionStrategy>,
    /// Only ever switches parallel mode on
    pub parallel: bool,
    pub project_name: Option<String>,
    pub project_version: Option<String>,
    pub log_level: Option<String>,
}

impl SplitConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(n) = overrides.max_partition_nodes {
            self.limits.max_partition_nodes = n;
        }

        if let Some(n) = overrides.max_page_nodes {
            self.limits.max_page_nodes = n;
        }

        if let Some(n) = overrides.first_window_nodes {
            self.limits.first_window_nodes = Some(n);
        }

        if let Some(bytes) = overrides.max_partition_bytes {
            self.limits.max_partition_bytes = Some(bytes);
        }

        if let Some(strategy) = overrides.strategy {
            self.partition.strategy = strategy;
        }

        if overrides.parallel {
            self.partition.parallel = true;
        }

        if let Some(ref name) = overrides.project_name {
            self.project.name = Some(name.clone());
        }

        if let Some(ref version) = overrides.project_version {
            self.project.version = Some(version.clone());
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    ///
    /// Every limit must be positive and the log level known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_partition_nodes == 0 {
            return Err(ConfigError::invalid_value(
                "limits.max_partition_nodes",
                "must be greater than zero",
            ));
        }
        if self.limits.max_page_nodes == 0 {
            return Err(ConfigError::invalid_value(
                "limits.max_page_nodes",
                "must be greater than zero",
            ));
        }
        if self.limits.first_window_nodes == Some(0) {
            return Err(ConfigError::invalid_value(
                "limits.first_window_nodes",
                "must be greater than zero",
            ));
        }
        if self.limits.max_partition_bytes == Some(0) {
            return Err(ConfigError::invalid_value(
                "limits.max_partition_bytes",
                "must be greater than zero",
            ));
        }
        if self.output.header_file.is_empty() {
            return Err(ConfigError::invalid_value(
                "output.header_file",
                "must not be empty",
            ));
        }
        if self.output.entry_prefix.is_empty() {
            return Err(ConfigError::invalid_value(
                "output.entry_prefix",
                "must not be empty",
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!(
                    "unknown level '{}'. Valid values: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }
        Ok(())
    }
}
