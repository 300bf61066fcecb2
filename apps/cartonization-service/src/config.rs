//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use cartonization_core::{PackingPolicy, ValidationError};
use cartonization_db::DbConfig;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Policy used when a request does not override a flag
    pub default_policy: PackingPolicy,

    /// Entries fetched per relay pass
    pub outbox_batch_size: u32,

    /// Emit JSON log lines instead of the human format
    pub log_json: bool,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_policy = PackingPolicy {
            optimize_for_minimum_boxes: parse_var(
                &lookup,
                "CARTONIZATION_OPTIMIZE_FOR_MINIMUM_BOXES",
                "true",
            )?,
            allow_mixed_categories: parse_var(&lookup, "CARTONIZATION_ALLOW_MIXED_CATEGORIES", "true")?,
            separate_fragile_items: parse_var(&lookup, "CARTONIZATION_SEPARATE_FRAGILE_ITEMS", "true")?,
            max_utilization_threshold: parse_var::<Decimal>(
                &lookup,
                "CARTONIZATION_MAX_UTILIZATION_THRESHOLD",
                "0.95",
            )?,
        };
        default_policy.validate()?;

        let config = ServiceConfig {
            database_path: lookup("CARTONIZATION_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./cartonization.db")),

            db_max_connections: parse_var(&lookup, "CARTONIZATION_DB_MAX_CONNECTIONS", "5")?,

            default_policy,

            outbox_batch_size: parse_var(&lookup, "CARTONIZATION_OUTBOX_BATCH_SIZE", "100")?,

            log_json: parse_var(&lookup, "CARTONIZATION_LOG_JSON", "false")?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "CARTONIZATION_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<T, ConfigError> {
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid default packing policy: {0}")]
    InvalidPolicy(#[from] ValidationError),
}
