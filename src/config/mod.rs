//! Configuration loading and management

mod io;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::progression::DEFAULT_MAX_WRITE_RETRIES;
use crate::progression::levels::DEFAULT_DISPLAY_CAP;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where progression data lives
    #[serde(default)]
    pub store: StoreSettings,

    /// Engine limits and display options
    #[serde(default)]
    pub engine: EngineSettings,

    /// XP overrides per activity kind (e.g. `recipe_generation = 20`)
    #[serde(default)]
    pub rewards: HashMap<String, i64>,
}

/// Progression store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Database file; defaults to ~/.brigade/progression.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// How long a write waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Compare-and-set retries before a write conflict is reported
    #[serde(default = "default_max_write_retries")]
    pub max_write_retries: u32,

    /// Highest level shown to users (XP itself is never capped)
    #[serde(default = "default_display_level_cap")]
    pub display_level_cap: u32,

    /// Upper bound for a whole CLI operation, in milliseconds
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    2_000
}

fn default_max_write_retries() -> u32 {
    DEFAULT_MAX_WRITE_RETRIES
}

fn default_display_level_cap() -> u32 {
    DEFAULT_DISPLAY_CAP
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_write_retries: default_max_write_retries(),
            display_level_cap: default_display_level_cap(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl StoreSettings {
    /// Configured database path, or the default under the global config dir
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| Config::global_config_dir().join("progression.db"))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl EngineSettings {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load an explicit config file, or the global one if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let global = Self::global_config_path();
                if global.exists() {
                    Self::from_file(&global)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
