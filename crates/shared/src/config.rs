//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Posting engine tuning.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key shared with the identity service.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Posting engine configuration.
///
/// Controls the identifier formats and the optimistic allocation retry loop.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Retries after the first allocation attempt before giving up.
    #[serde(default = "default_max_allocation_retries")]
    pub max_allocation_retries: u32,
    /// Base backoff between allocation attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// VAT percentage applied when a request does not carry one.
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Decimal,
    /// Prefix for generated transaction numbers.
    #[serde(default = "default_transaction_prefix")]
    pub transaction_prefix: String,
    /// Prefix for generated invoice numbers.
    #[serde(default = "default_invoice_prefix")]
    pub invoice_prefix: String,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            max_allocation_retries: default_max_allocation_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            default_vat_rate: default_vat_rate(),
            transaction_prefix: default_transaction_prefix(),
            invoice_prefix: default_invoice_prefix(),
        }
    }
}

fn default_max_allocation_retries() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    10
}

fn default_vat_rate() -> Decimal {
    Decimal::from(13) // Nepal standard VAT
}

fn default_transaction_prefix() -> String {
    "TRX".to_string()
}

fn default_invoice_prefix() -> String {
    "INV".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KHATA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_posting_defaults() {
        let posting = PostingConfig::default();
        assert_eq!(posting.max_allocation_retries, 5);
        assert_eq!(posting.retry_backoff_ms, 10);
        assert_eq!(posting.default_vat_rate, dec!(13));
        assert_eq!(posting.transaction_prefix, "TRX");
        assert_eq!(posting.invoice_prefix, "INV");
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("KHATA__DATABASE__URL", Some("postgres://localhost/khata_test")),
                ("KHATA__JWT__SECRET", Some("env-secret")),
                ("KHATA__POSTING__TRANSACTION_PREFIX", Some("TXN")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/khata_test");
                assert_eq!(config.jwt.secret, "env-secret");
                assert_eq!(config.posting.transaction_prefix, "TXN");
                assert_eq!(config.posting.max_allocation_retries, 5);
                assert_eq!(config.server.port, 8080);
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_load_without_database_fails() {
        temp_env::with_vars_unset(["KHATA__DATABASE__URL", "KHATA__JWT__SECRET"], || {
            assert!(AppConfig::load().is_err());
        });
    }
}
