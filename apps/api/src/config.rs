//! API server configuration.
//!
//! Settings are layered with the `config` crate, later sources winning:
//!
//! ```text
//! ServerConfig::default()  →  tienda.toml (or $TIENDA_CONFIG)  →  TIENDA_* env
//! ```
//!
//! | Key                    | Env var                        | Default          |
//! |------------------------|--------------------------------|------------------|
//! | `host`                 | `TIENDA_HOST`                  | `0.0.0.0`        |
//! | `port`                 | `TIENDA_PORT`                  | `8080`           |
//! | `database_path`        | `TIENDA_DATABASE_PATH`         | `tienda.db`      |
//! | `max_connections`      | `TIENDA_MAX_CONNECTIONS`       | `5`              |
//! | `jwt_secret`           | `TIENDA_JWT_SECRET`            | dev secret       |
//! | `token_ttl_secs`       | `TIENDA_TOKEN_TTL_SECS`        | `86400`          |
//! | `utc_offset_minutes`   | `TIENDA_UTC_OFFSET_MINUTES`    | `-360`           |
//! | `tax_rate_bps`         | `TIENDA_TAX_RATE_BPS`          | `1600`           |
//! | `allow_negative_stock` | `TIENDA_ALLOW_NEGATIVE_STOCK`  | `false`          |
//! | `request_timeout_secs` | `TIENDA_REQUEST_TIMEOUT_SECS`  | `30`             |
//! | `cors_origins`         | `TIENDA_CORS_ORIGINS`          | `*`              |

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tienda_core::clock::DEFAULT_UTC_OFFSET_MINUTES;
use tienda_core::validation::validate_tax_rate_bps;
use tienda_core::{StockPolicy, StoreClock, TaxRate};
use tienda_db::DbConfig;

/// Signing secret used when none is configured. Never deploy with it.
pub const DEV_JWT_SECRET: &str = "tienda-dev-secret-change-in-production";

/// Largest real-world UTC offset, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// SQLite database file, created on first start
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// HMAC secret for signing bearer tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_ttl_secs: i64,

    /// Store's fixed UTC offset; decides the business date of a sale
    pub utc_offset_minutes: i32,

    /// Sales tax in basis points (1600 = 16%)
    pub tax_rate_bps: u32,

    /// Sell past zero stock instead of rejecting the sale
    pub allow_negative_stock: bool,

    /// Request timeout in seconds (408 when exceeded)
    pub request_timeout_secs: u64,

    /// `*` for any origin, otherwise comma-separated origins
    pub cors_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: PathBuf::from("tienda.db"),
            max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: 24 * 60 * 60,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            tax_rate_bps: TaxRate::default().bps(),
            allow_negative_stock: false,
            request_timeout_secs: 30,
            cors_origins: "*".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the file named by `TIENDA_CONFIG` (required
    /// when set), else an optional `tienda.toml`, then `TIENDA_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("TIENDA_CONFIG").ok();
        Self::load_from(file.as_deref())
    }

    /// Loads configuration with an explicit file path.
    pub fn load_from(file: Option<&str>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name("tienda").required(false),
        };

        let config: ServerConfig = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(file_source)
            .add_source(Environment::with_prefix("TIENDA").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::invalid("jwt_secret", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "must not be 0"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::invalid("max_connections", "must be at least 1"));
        }
        if self.token_ttl_secs <= 0 {
            return Err(ConfigError::invalid("token_ttl_secs", "must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::invalid(
                "utc_offset_minutes",
                "must be within ±14 hours",
            ));
        }
        validate_tax_rate_bps(self.tax_rate_bps)
            .map_err(|e| ConfigError::invalid("tax_rate_bps", e.to_string()))?;
        Ok(())
    }

    /// True when tokens are signed with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn stock_policy(&self) -> StockPolicy {
        if self.allow_negative_stock {
            StockPolicy::AllowNegative
        } else {
            StockPolicy::Reject
        }
    }

    /// The store clock for the configured offset.
    pub fn clock(&self) -> StoreClock {
        StoreClock::from_offset_minutes(self.utc_offset_minutes).unwrap_or_default()
    }

    /// Pool settings for the configured database file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    /// Allowed CORS origins, or `None` for any origin.
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        let origins = self.cors_origins.trim();
        if origins == "*" {
            return None;
        }
        Some(
            origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.uses_dev_secret());
        assert_eq!(config.tax_rate().bps(), 1600);
        assert_eq!(config.stock_policy(), StockPolicy::Reject);
        assert_eq!(config.cors_origin_list(), None);
        assert_eq!(config.clock().offset().local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
port = 9090
jwt_secret = "from-file"
allow_negative_stock = true
cors_origins = "http://localhost:5173, http://caja.local"
"#
        )
        .unwrap();

        let config = ServerConfig::load_from(file.path().to_str()).unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.jwt_secret, "from-file");
        assert_eq!(config.stock_policy(), StockPolicy::AllowNegative);
        assert_eq!(
            config.cors_origin_list(),
            Some(vec![
                "http://localhost:5173".to_string(),
                "http://caja.local".to_string()
            ])
        );
        // Untouched keys keep their defaults
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.token_ttl_secs, 86_400);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = ServerConfig::load_from(Some("/nonexistent/tienda-config.toml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ServerConfig {
            jwt_secret: "  ".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        config.jwt_secret = "ok".to_string();
        config.utc_offset_minutes = 15 * 60;
        assert!(config.validate().is_err());

        config.utc_offset_minutes = 0;
        config.tax_rate_bps = 10_001;
        assert!(config.validate().is_err());
    }
}
