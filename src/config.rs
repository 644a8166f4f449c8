//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::jobs::PollPolicy;
use crate::shopee::Country;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// ScraperAPI key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Shopee country storefront
    #[serde(default)]
    pub country: Country,

    /// Proxy URL for reaching ScraperAPI (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Items requested per listing page
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Write the raw JSON dump
    #[serde(default = "default_true")]
    pub save_raw: bool,

    /// Write the parsed CSV
    #[serde(default = "default_true")]
    pub save_parsed: bool,

    /// Add a USD price column
    #[serde(default = "default_true")]
    pub convert_usd: bool,

    /// Hide sold-out items
    #[serde(default)]
    pub filter_sold_out: bool,

    /// Directory for raw and parsed outputs
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Exchange rate file (defaults to `<data_dir>/exchange_rates.json`)
    #[serde(default)]
    pub rates_path: Option<PathBuf>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Polling schedules
    #[serde(default)]
    pub polling: PollingConfig,
}

fn default_chunk_size() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            country: Country::Malaysia,
            proxy: None,
            chunk_size: default_chunk_size(),
            save_raw: true,
            save_parsed: true,
            convert_usd: true,
            filter_sold_out: false,
            data_dir: None,
            rates_path: None,
            format: OutputFormat::Table,
            polling: PollingConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("shopee-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Malformed values are rejected.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(key) = std::env::var("SHOPEE_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }

        if let Ok(country) = std::env::var("SHOPEE_COUNTRY") {
            self.country = country.parse::<Country>().context("Invalid SHOPEE_COUNTRY")?;
        }

        if let Ok(proxy) = std::env::var("SHOPEE_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(dir) = std::env::var("SHOPEE_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(size) = std::env::var("SHOPEE_CHUNK_SIZE") {
            self.chunk_size = size
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid SHOPEE_CHUNK_SIZE: {}", size))?;
        }

        Ok(self)
    }

    /// Returns the API key or explains how to provide one.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => anyhow::bail!(
                "Missing ScraperAPI API key. Set SHOPEE_API_KEY, pass --api-key, or add api_key to config.toml"
            ),
        }
    }

    /// Directory holding `raw/` and `parsed/` outputs.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir().map(|d| d.join("shopee-crawler")).unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Location of the exchange rate file.
    pub fn rates_path(&self) -> PathBuf {
        self.rates_path.clone().unwrap_or_else(|| self.data_dir().join("exchange_rates.json"))
    }
}

/// Polling schedules for the three kinds of job runs, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Pause between submission and the first status check
    pub initial_delay_ms: u64,
    /// First listing page (single job)
    pub single_interval_ms: u64,
    pub single_max_attempts: u32,
    /// Remaining listing pages (batch)
    pub batch_interval_ms: u64,
    pub batch_max_attempts: u32,
    /// Exchange rate refresh (batch)
    pub rates_interval_ms: u64,
    pub rates_max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 3000,
            single_interval_ms: 3000,
            single_max_attempts: 12,
            batch_interval_ms: 5000,
            batch_max_attempts: 12,
            rates_interval_ms: 2000,
            rates_max_attempts: 10,
        }
    }
}

impl PollingConfig {
    /// No pauses at all; used by tests.
    pub fn immediate() -> Self {
        Self {
            initial_delay_ms: 0,
            single_interval_ms: 0,
            batch_interval_ms: 0,
            rates_interval_ms: 0,
            ..Self::default()
        }
    }

    pub fn single_policy(&self) -> PollPolicy {
        self.policy(self.single_interval_ms, self.single_max_attempts)
    }

    pub fn batch_policy(&self) -> PollPolicy {
        self.policy(self.batch_interval_ms, self.batch_max_attempts)
    }

    pub fn rates_policy(&self) -> PollPolicy {
        self.policy(self.rates_interval_ms, self.rates_max_attempts)
    }

    fn policy(&self, interval_ms: u64, max_attempts: u32) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(interval_ms),
            max_attempts,
        )
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
