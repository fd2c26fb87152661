use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "ASKCHAT_ENDPOINT";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the assistant API; `/ask` is appended
    pub endpoint: String,

    /// Client-side request timeout. None leaves the transport default.
    pub request_timeout_secs: Option<u64>,

    /// askchat home directory
    #[serde(skip)]
    pub askchat_home: PathBuf,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub placeholder: String,
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "💬 Product Info Assistant".to_string(),
            placeholder: "Ask about a product...".to_string(),
            tick_rate_ms: 120,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: None,
            askchat_home: default_home(),
            ui: UiConfig::default(),
        }
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".askchat")
}

impl Config {
    /// Load configuration from `~/.askchat/config.toml`, or from `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let askchat_home = default_home();
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| askchat_home.join("config.toml"));

        let mut config = Self::from_file(&config_path)?;
        config.askchat_home = askchat_home;
        Ok(config)
    }

    /// Parse a config file; a missing file yields defaults
    pub fn from_file(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Apply endpoint overrides: environment first, then command line
    pub fn apply_overrides(&mut self, env_endpoint: Option<String>, cli_endpoint: Option<String>) {
        if let Some(endpoint) = cli_endpoint.or(env_endpoint) {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint.trim().to_string();
            }
        }
    }

    pub fn ensure_home(&self) -> Result<()> {
        fs::create_dir_all(&self.askchat_home).context("Failed to create .askchat directory")
    }

    pub fn log_path(&self) -> PathBuf {
        self.askchat_home.join("askchat.log")
    }
}
