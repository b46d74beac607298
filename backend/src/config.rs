//! Configuration management for the Pharmacy Inventory server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PIM_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::LedgerPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Log output configuration
    pub logging: LoggingConfig,

    /// Ledger and checkout tunables
    pub ledger: LedgerConfig,

    /// Text-generation insight provider
    pub insights: InsightsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Shelf life in days given to batches first created by a restock
    pub restock_shelf_life_days: i64,

    /// Expiry alert look-ahead window in days
    pub expiry_window_days: i64,

    /// Sales tax rate applied at checkout
    pub tax_rate: Decimal,
}

/// Longest restock shelf life accepted from configuration (100 years)
const MAX_RESTOCK_SHELF_LIFE_DAYS: i64 = 36_500;

impl LedgerConfig {
    /// Reject values the ledger cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RESTOCK_SHELF_LIFE_DAYS).contains(&self.restock_shelf_life_days) {
            return Err(ConfigError::Message(format!(
                "ledger.restock_shelf_life_days must be between 1 and {}, got {}",
                MAX_RESTOCK_SHELF_LIFE_DAYS, self.restock_shelf_life_days
            )));
        }
        if self.expiry_window_days < 0 {
            return Err(ConfigError::Message(format!(
                "ledger.expiry_window_days cannot be negative, got {}",
                self.expiry_window_days
            )));
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(ConfigError::Message(format!(
                "ledger.tax_rate must be between 0 and 1, got {}",
                self.tax_rate
            )));
        }
        Ok(())
    }

    pub fn policy(&self) -> LedgerPolicy {
        LedgerPolicy {
            restock_shelf_life_days: self.restock_shelf_life_days,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            restock_shelf_life_days: shared::DEFAULT_RESTOCK_SHELF_LIFE_DAYS,
            expiry_window_days: shared::DEFAULT_EXPIRY_WINDOW_DAYS,
            tax_rate: shared::DEFAULT_TAX_RATE,
        }
    }
}

/// Which insight provider to use
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightProviderKind {
    /// Placeholder text, no network
    Static,
    /// Generative-language HTTP API
    Gemini,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InsightsConfig {
    pub provider: InsightProviderKind,

    /// Base URL of the generative-language API
    pub api_endpoint: String,

    /// API key; required when provider is `gemini`
    pub api_key: Option<String>,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("PIM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.json", false)?
            .set_default(
                "ledger.restock_shelf_life_days",
                shared::DEFAULT_RESTOCK_SHELF_LIFE_DAYS,
            )?
            .set_default("ledger.expiry_window_days", shared::DEFAULT_EXPIRY_WINDOW_DAYS)?
            .set_default("ledger.tax_rate", shared::DEFAULT_TAX_RATE.to_string())?
            .set_default("insights.provider", "static")?
            .set_default(
                "insights.api_endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("insights.model", "gemini-1.5-flash")?
            .set_default("insights.timeout_secs", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PIM_ prefix)
            .add_source(
                Environment::with_prefix("PIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.ledger.validate()?;
        Ok(config)
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
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
