//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.bdiosplit/config.toml`
//! 2. Explicit config file passed with `--config`
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{
    ConfigOverrides, LimitsConfig, LoggingConfig, OutputConfig, PartitionConfig,
    PartitionStrategy, ProjectConfig, SplitConfig,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".bdiosplit";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.bdiosplit`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<SplitConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.bdiosplit`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load configuration with an optional explicit file and CLI overrides.
    ///
    /// Merges config in order: global → explicit file → overrides, then
    /// validates the result.
    pub fn load(
        &mut self,
        config_file: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<SplitConfig, ConfigError> {
        let mut config = SplitConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            debug!("Loading config from {:?}", path);
            config = merge_configs(config, load_config_file(path)?);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<SplitConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<SplitConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// Overlay values equal to the default are treated as unset, so partial
/// files only override what they name.
fn merge_configs(base: SplitConfig, overlay: SplitConfig) -> SplitConfig {
    SplitConfig {
        limits: merge_limits(base.limits, overlay.limits),
        partition: merge_partition(base.partition, overlay.partition),
        output: merge_output(base.output, overlay.output),
        project: merge_project(base.project, overlay.project),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

fn merge_limits(base: LimitsConfig, overlay: LimitsConfig) -> LimitsConfig {
    let defaults = LimitsConfig::default();
    LimitsConfig {
        max_partition_nodes: if overlay.max_partition_nodes != defaults.max_partition_nodes {
            overlay.max_partition_nodes
        } else {
            base.max_partition_nodes
        },
        max_page_nodes: if overlay.max_page_nodes != defaults.max_page_nodes {
            overlay.max_page_nodes
        } else {
            base.max_page_nodes
        },
        first_window_nodes: overlay.first_window_nodes.or(base.first_window_nodes),
        max_partition_bytes: overlay.max_partition_bytes.or(base.max_partition_bytes),
    }
}

fn merge_partition(base: PartitionConfig, overlay: PartitionConfig) -> PartitionConfig {
    PartitionConfig {
        strategy: if overlay.strategy != PartitionStrategy::Count {
            overlay.strategy
        } else {
            base.strategy
        },
        parallel: overlay.parallel || base.parallel,
    }
}

fn merge_output(base: OutputConfig, overlay: OutputConfig) -> OutputConfig {
    let defaults = OutputConfig::default();
    OutputConfig {
        header_file: if overlay.header_file != defaults.header_file {
            overlay.header_file
        } else {
            base.header_file
        },
        entry_prefix: if overlay.entry_prefix != defaults.entry_prefix {
            overlay.entry_prefix
        } else {
            base.entry_prefix
        },
        name_marker: if overlay.name_marker != defaults.name_marker {
            overlay.name_marker
        } else {
            base.name_marker
        },
    }
}

fn merge_project(base: ProjectConfig, overlay: ProjectConfig) -> ProjectConfig {
    ProjectConfig {
        name: overlay.name.or(base.name),
        version: overlay.version.or(base.version),
    }
}

fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
    }
}
