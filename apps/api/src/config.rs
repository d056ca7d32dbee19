//! API server configuration.
//!
//! Loaded from `VORCA_*` environment variables with fallback to defaults.
//!
//! | Variable                    | Default             |
//! |-----------------------------|---------------------|
//! | `VORCA_PORT`                | `8080`              |
//! | `VORCA_DATABASE_PATH`       | `./vorca.db`        |
//! | `VORCA_JWT_SECRET`          | dev secret          |
//! | `VORCA_TAX_RATE_BPS`        | `1100` (11%)        |
//! | `VORCA_STOCK_POLICY`        | `allow_negative`    |
//! | `VORCA_MAX_RETRIES`         | `8`                 |
//! | `VORCA_DB_MAX_CONNECTIONS`  | `5`                 |
//! | `VORCA_LOW_STOCK_THRESHOLD` | `10`                |

use std::env;
use std::path::PathBuf;

use vorca_core::validation::{validate_tax_rate_bps, validate_threshold};
use vorca_core::{StockPolicy, TaxRate, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TAX_RATE_BPS};
use vorca_db::{DbConfig, EngineConfig};

const DEV_JWT_SECRET: &str = "vorca-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Shared secret for HS256 bearer tokens
    pub jwt_secret: String,

    /// Sales tax in basis points
    pub tax_rate_bps: u32,

    /// Oversell handling
    pub stock_policy: StockPolicy,

    /// Attempts per write operation under contention
    pub max_retries: u32,

    /// Pool size
    pub db_max_connections: u32,

    /// Threshold for inventory rows created lazily
    pub low_stock_threshold: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: 8080,
            database_path: PathBuf::from("./vorca.db"),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            stock_policy: StockPolicy::default(),
            max_retries: 8,
            db_max_connections: 5,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            port: parse_or(&lookup, "VORCA_PORT", defaults.port)?,

            database_path: lookup("VORCA_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            jwt_secret: lookup("VORCA_JWT_SECRET").unwrap_or(defaults.jwt_secret),

            tax_rate_bps: parse_or(&lookup, "VORCA_TAX_RATE_BPS", defaults.tax_rate_bps)?,

            stock_policy: match lookup("VORCA_STOCK_POLICY") {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("VORCA_STOCK_POLICY".to_string()))?,
                None => defaults.stock_policy,
            },

            max_retries: parse_or(&lookup, "VORCA_MAX_RETRIES", defaults.max_retries)?,

            db_max_connections: parse_or(
                &lookup,
                "VORCA_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            low_stock_threshold: parse_or(
                &lookup,
                "VORCA_LOW_STOCK_THRESHOLD",
                defaults.low_stock_threshold,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("VORCA_JWT_SECRET".to_string()));
        }
        validate_tax_rate_bps(self.tax_rate_bps)
            .map_err(|_| ConfigError::InvalidValue("VORCA_TAX_RATE_BPS".to_string()))?;
        validate_threshold(self.low_stock_threshold)
            .map_err(|_| ConfigError::InvalidValue("VORCA_LOW_STOCK_THRESHOLD".to_string()))?;
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue("VORCA_MAX_RETRIES".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("VORCA_DB_MAX_CONNECTIONS".to_string()));
        }
        Ok(())
    }

    /// Pool settings for the configured database file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .tax_rate(TaxRate::from_bps(self.tax_rate_bps))
            .stock_policy(self.stock_policy)
            .default_low_stock_threshold(self.low_stock_threshold)
            .max_attempts(self.max_retries)
    }

    /// True when running with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.tax_rate_bps, 1100);
        assert_eq!(config.stock_policy, StockPolicy::AllowNegative);
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("VORCA_PORT", "9000"),
            ("VORCA_STOCK_POLICY", "strict"),
            ("VORCA_TAX_RATE_BPS", "0"),
            ("VORCA_JWT_SECRET", "s3cret"),
            ("VORCA_MAX_RETRIES", "3"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.stock_policy, StockPolicy::Strict);
        assert!(!config.uses_dev_secret());

        let engine = config.engine_config();
        assert_eq!(engine.tax_rate.bps(), 0);
        assert_eq!(engine.retry.max_attempts, 3);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("VORCA_PORT", "eighty")]),
            Err(ConfigError::InvalidValue(key)) if key == "VORCA_PORT"
        ));
        assert!(load(&[("VORCA_STOCK_POLICY", "yolo")]).is_err());
        assert!(load(&[("VORCA_MAX_RETRIES", "0")]).is_err());
        assert!(load(&[("VORCA_JWT_SECRET", "  ")]).is_err());
    }
}
