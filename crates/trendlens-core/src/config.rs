//! Configuration management with file persistence

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// TrendLens configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
}

/// Tunables for the search engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-adapter timeout in milliseconds; expiry discards the source's output
    pub adapter_timeout_ms: u64,
    /// Default result limit when a request does not specify one
    pub default_limit: u32,
    /// Hard upper bound on the requested result limit
    pub max_limit: u32,
    /// Floor for the per-source cap under federated scope
    pub min_per_source: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_ms: 5_000,
            default_limit: 50,
            max_limit: 200,
            min_per_source: 5,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("TRENDLENS_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("trendlens")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_file() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk, falling back to defaults if missing
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_file()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_file()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
