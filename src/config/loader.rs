//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every section and field
//! has a default, so an empty file is a valid config.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::helius::{HeliusConfig, HELIUS_RPC_URL};
use crate::adapters::price_feed::{PriceFeedConfig, PriceSourceKind};
use crate::application::{FetcherConfig, PipelineSettings};
use crate::domain::ValuationPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub balances: BalancesSection,
    pub prices: PricesSection,
    pub valuation: ValuationSection,
    pub logging: LoggingSection,
}

/// HTTP server section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Balance provider (Helius DAS) section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BalancesSection {
    pub api_url: String,
    /// May reference environment variables, e.g. `"${HELIUS_API_KEY}"`
    pub api_key: String,
    /// Assets per page
    pub page_limit: u32,
    /// Maximum pages fetched per wallet
    pub max_pages: u32,
    pub timeout_secs: u64,
}

impl Default for BalancesSection {
    fn default() -> Self {
        Self {
            api_url: HELIUS_RPC_URL.to_string(),
            api_key: String::new(),
            page_limit: 1000,
            max_pages: 10,
            timeout_secs: 30,
        }
    }
}

/// Price provider section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricesSection {
    /// "dexscreener" or "jupiter"
    pub source: PriceSourceKind,
    /// Defaults to the selected source's public API
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// Addresses per request
    pub batch_size: usize,
    /// Delay before each batch after the first
    pub pacing_ms: u64,
    /// Delay before retrying a rate-limited batch
    pub rate_limit_backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for PricesSection {
    fn default() -> Self {
        Self {
            source: PriceSourceKind::DexScreener,
            api_url: None,
            api_key: None,
            batch_size: 30,
            pacing_ms: 1000,
            rate_limit_backoff_ms: 5000,
            timeout_secs: 10,
        }
    }
}

/// Valuation policy section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValuationSection {
    /// USD floor; holdings worth less are dropped
    pub min_usd_value: f64,
    /// Cap on returned holdings (omit for unbounded)
    pub max_results: Option<usize>,
    /// Stop fetching once this many holdings clear the floor (omit to disable)
    pub early_stop_target: Option<usize>,
    /// Fetch prices for the largest balances first
    pub prioritize_by_amount: bool,
}

impl Default for ValuationSection {
    fn default() -> Self {
        Self {
            min_usd_value: 10.0,
            max_results: None,
            early_stop_target: None,
            prioritize_by_amount: true,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file, apply environment overrides and validate
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Configuration from defaults and environment only (no file)
pub fn default_config() -> Result<Config, ConfigError> {
    parse_config("", |key| std::env::var(key).ok())
}

/// Parse TOML, apply overrides from `lookup` and validate
pub fn parse_config<F>(content: &str, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content)?;
    config.apply_overrides(lookup)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Apply `HELIUS_API_KEY` / `PORT` overrides and expand `${VAR}` in keys
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("HELIUS_API_KEY").filter(|k| !k.is_empty()) {
            self.balances.api_key = key;
        } else {
            self.balances.api_key = expand(&self.balances.api_key, &lookup)?;
        }

        if let Some(ref key) = self.prices.api_key {
            self.prices.api_key = Some(expand(key, &lookup)?).filter(|k| !k.is_empty());
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got {:?}", port))
            })?;
        }

        Ok(())
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.balances.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "balances.api_url cannot be empty".to_string(),
            ));
        }

        if self.balances.page_limit == 0 {
            return Err(ConfigError::ValidationError(
                "balances.page_limit must be > 0".to_string(),
            ));
        }

        if matches!(self.prices.api_url.as_deref(), Some("")) {
            return Err(ConfigError::ValidationError(
                "prices.api_url cannot be empty".to_string(),
            ));
        }

        let max_batch = self.prices.source.max_batch_size();
        if self.prices.batch_size == 0 || self.prices.batch_size > max_batch {
            return Err(ConfigError::ValidationError(format!(
                "prices.batch_size must be 1-{} for {}, got {}",
                max_batch, self.prices.source, self.prices.batch_size
            )));
        }

        if self.valuation.min_usd_value.is_nan() || self.valuation.min_usd_value < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "valuation.min_usd_value must be >= 0, got {}",
                self.valuation.min_usd_value
            )));
        }

        if self.valuation.max_results == Some(0) {
            return Err(ConfigError::ValidationError(
                "valuation.max_results must be > 0 (omit it for no cap)".to_string(),
            ));
        }

        if self.valuation.early_stop_target == Some(0) {
            return Err(ConfigError::ValidationError(
                "valuation.early_stop_target must be > 0 (omit it to disable)".to_string(),
            ));
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn policy(&self) -> ValuationPolicy {
        ValuationPolicy::value_floor(self.valuation.min_usd_value)
            .with_max_results(self.valuation.max_results)
            .with_early_stop(self.valuation.early_stop_target)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            batch_size: self.prices.batch_size,
            prioritize_by_amount: self.valuation.prioritize_by_amount,
            policy: self.policy(),
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            pacing: Duration::from_millis(self.prices.pacing_ms),
            rate_limit_backoff: Duration::from_millis(self.prices.rate_limit_backoff_ms),
        }
    }

    pub fn price_feed_config(&self) -> PriceFeedConfig {
        let mut config = PriceFeedConfig::for_source(self.prices.source);
        if let Some(ref api_url) = self.prices.api_url {
            config.api_url = api_url.clone();
        }
        config.api_key = self.prices.api_key.clone();
        config.timeout = Duration::from_secs(self.prices.timeout_secs);
        config
    }

    pub fn helius_config(&self) -> HeliusConfig {
        HeliusConfig {
            api_url: self.balances.api_url.clone(),
            api_key: self.balances.api_key.clone(),
            page_limit: self.balances.page_limit,
            max_pages: self.balances.max_pages,
            timeout: Duration::from_secs(self.balances.timeout_secs),
        }
    }
}

/// Expand `$VAR` / `${VAR}` references using `lookup`
fn expand<F>(value: &str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    shellexpand::env_with_context(value, |var: &str| {
        lookup(var).map(Some).ok_or(std::env::VarError::NotPresent)
    })
    .map(|expanded| expanded.into_owned())
    .map_err(|e| ConfigError::ValidationError(e.to_string()))
}
