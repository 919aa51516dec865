//! Configuration file handling for openhab-events

use anyhow::{Context, Result};
use openhab_events::ConnectionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Fallback hub URL when neither flags nor the config file name one
pub const DEFAULT_URL: &str = "http://localhost:8080";

/// Configuration for the CLI tool
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Hub base URL
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Default output format
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("openhab-events");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: ArgOverrides) -> MergedConfig {
        MergedConfig {
            url: args
                .url
                .or_else(|| self.url.clone())
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            username: args.username.or_else(|| self.username.clone()),
            password: args.password.or_else(|| self.password.clone()),
            output: args
                .output
                .or_else(|| self.output.clone())
                .unwrap_or_else(|| "json".to_string()),
            no_color: args.no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Default)]
pub struct ArgOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub output: Option<String>,
    pub no_color: bool,
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub output: String,
    pub no_color: bool,
}

impl MergedConfig {
    /// Output format; an unknown name from the config file is an error
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::parse(&self.output).with_context(|| {
            format!(
                "Invalid output format '{}' (expected json or compact)",
                self.output
            )
        })
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.url.clone())
            .with_optional_credentials(self.username.clone(), self.password.clone())
    }
}
