//! CLI configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file (`KASIR_DB_PATH`, default `./kasir.db`)
    pub db_path: PathBuf,

    /// Printed on receipts (`KASIR_STORE_NAME`)
    pub store_name: String,

    /// Pool size (`KASIR_DB_MAX_CONNECTIONS`, default 5)
    pub db_max_connections: u32,

    /// Rows in the dashboard's low-stock list (`KASIR_LOW_STOCK_LIMIT`, default 10)
    pub low_stock_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from("./kasir.db"),
            store_name: "Toko UMKM".to_string(),
            db_max_connections: 5,
            low_stock_limit: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            db_path: lookup("KASIR_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            store_name: lookup("KASIR_STORE_NAME").unwrap_or(defaults.store_name),

            db_max_connections: parse_or(
                &lookup,
                "KASIR_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            low_stock_limit: parse_or(&lookup, "KASIR_LOW_STOCK_LIMIT", defaults.low_stock_limit)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("KASIR_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.store_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("KASIR_STORE_NAME".to_string()));
        }

        Ok(config)
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
