//! Configuration management for channelmix
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.channelmix/config.toml

use crate::budget::AllocatorConfig;
use crate::dataset::DatasetOptions;
use crate::errors::{MixError, Result};
use crate::types::ChannelName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration for channelmix
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub allocator: AllocatorConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub data: DatasetOptions,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Report presentation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub company_name: String,
    pub default_channels: Vec<String>,
}

/// Telemetry display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub default_verbosity: String,
    pub color_output: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Marketing Mix Report".to_string(),
            company_name: String::new(),
            default_channels: [
                "Paid Search",
                "Organic Search",
                "Email",
                "Social",
                "Display",
                "Direct",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ReportConfig {
    /// Order channels as a touchpoint journey
    ///
    /// Channels matching an entry of `default_channels` come first, in that
    /// list's order; the rest follow in their given order. Matching ignores
    /// case and treats spaces, dashes and underscores alike, so
    /// `paid_search` matches "Paid Search".
    pub fn journey_order<'a>(
        &self,
        channels: impl IntoIterator<Item = &'a ChannelName>,
    ) -> Vec<ChannelName> {
        let mut ranked: Vec<(usize, usize, &ChannelName)> = channels
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let key = channel_key(name);
                let rank = self
                    .default_channels
                    .iter()
                    .position(|d| channel_key(d) == key)
                    .unwrap_or(self.default_channels.len());
                (rank, i, name)
            })
            .collect();
        ranked.sort();
        ranked.into_iter().map(|(_, _, name)| name.clone()).collect()
    }
}

fn channel_key(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_verbosity: "normal".to_string(),
            color_output: true,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MixError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| MixError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".channelmix").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.allocator.max_iterations == 0 {
            return Err(MixError::ConfigError(
                "allocator.max_iterations must be greater than 0".to_string(),
            ));
        }

        if !(self.allocator.tolerance > 0.0 && self.allocator.tolerance < 1.0) {
            return Err(MixError::ConfigError(
                "allocator.tolerance must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        if self.data.date_column.trim().is_empty() {
            return Err(MixError::ConfigError(
                "data.date_column must not be empty".to_string(),
            ));
        }

        match self.telemetry.default_verbosity.as_str() {
            "quiet" | "normal" | "verbose" | "very_verbose" => {}
            _ => {
                return Err(MixError::ConfigError(format!(
                    "Invalid verbosity level: {}",
                    self.telemetry.default_verbosity
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MixError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MixError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| MixError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as TOML for display
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MixError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}
