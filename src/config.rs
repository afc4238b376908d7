use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::board::{INITIAL_DISPLAYED, PAGE_STEP, POLL_INTERVAL};

/// Configuration file structure for pipeboard.
///
/// Lets a wall-board machine keep its board URL and refresh settings in a
/// file instead of on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Board endpoint and refresh settings
    #[serde(default)]
    pub board: BoardConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoardConfig {
    /// Page URL of the board (e.g., 'https://bamboo.example.com/plugins/servlet/cdpipeline')
    pub url: Option<String>,

    /// Delay between polls in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Rows shown before the first "load more"
    #[serde(default = "default_initial_displayed")]
    pub initial_displayed: usize,

    /// Rows added by each "load more"
    #[serde(default = "default_page_step")]
    pub page_step: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default snapshot output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            url: None,
            interval_ms: default_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            initial_displayed: default_initial_displayed(),
            page_step: default_page_step(),
        }
    }
}

fn default_interval_ms() -> u64 {
    u64::try_from(POLL_INTERVAL.as_millis()).unwrap_or(u64::MAX)
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_initial_displayed() -> usize {
    INITIAL_DISPLAYED
}

fn default_page_step() -> usize {
    PAGE_STEP
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipeboard.toml
    /// 3. ./pipeboard.json
    /// 4. ./pipeboard.yaml
    /// 5. ./pipeboard.yml
    /// 6. `<config dir>/pipeboard/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "pipeboard.toml",
            "pipeboard.json",
            "pipeboard.yaml",
            "pipeboard.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pipeboard").join("config.toml"))
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
