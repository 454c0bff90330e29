//! Configuration management for the FreshMarket server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::ExpiredStockPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// External marketplace API configuration
    pub marketplace: MarketplaceConfig,

    /// AI demand forecast endpoint configuration
    pub forecast: ForecastConfig,

    /// Source-list refresh loop configuration
    pub refresh: RefreshConfig,

    /// Valuation policy knobs
    pub valuation: ValuationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketplaceConfig {
    /// Base URL of the external marketplace REST API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Base URL of the AI forecast service (usually the marketplace API)
    pub base_url: String,

    /// Request timeout in seconds; forecasts can take a while
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Seconds between source-list refreshes
    pub interval_secs: u64,

    /// Disable to serve only on-demand refreshes (mainly for tests)
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValuationConfig {
    /// Day window for the retailer-facing expiring-soon flag
    pub expiring_soon_within_days: i64,

    /// Whether expired batches stay orderable at clearance price
    pub expired_stock: ExpiredStockPolicy,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("marketplace.base_url", "http://localhost:8000")?
            .set_default("marketplace.timeout_secs", 10)?
            .set_default("forecast.base_url", "http://localhost:8000")?
            .set_default("forecast.timeout_secs", 60)?
            .set_default("refresh.interval_secs", 30)?
            .set_default("refresh.enabled", true)?
            .set_default("valuation.expiring_soon_within_days", 7)?
            .set_default("valuation.expired_stock", "clearance_listed")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FM_ prefix)
            .add_source(
                Environment::with_prefix("FM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
