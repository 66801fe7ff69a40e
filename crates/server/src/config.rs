//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLIENTELE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CLIENTELE_HOST` - Bind address (default: 0.0.0.0)
//! - `CLIENTELE_PORT` - Listen port (default: 8080, falls back to `PORT`)
//! - `CLIENTELE_DB_MAX_CONNECTIONS` - Pool size (default: 25)
//! - `CLIENTELE_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 5)
//! - `CLIENTELE_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a pooled connection (default: 30)
//! - `CLIENTELE_CACHE_CAPACITY` - Maximum cached entries (default: 10000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Connection pool sizing
    pub pool: PoolConfig,
    /// Maximum number of cached customer entries
    pub cache_capacity: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Database pool limits.
///
/// Callers block in `acquire` for up to `acquire_timeout` once every
/// connection is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 25,
            min_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(5 * 60),
        }
    }
}

impl ServerConfig {
    /// Default number of cached entries (four keys per customer).
    pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CLIENTELE_DATABASE_URL")?;
        let host = parse_env("CLIENTELE_HOST", "0.0.0.0")?;
        let port = match std::env::var("CLIENTELE_PORT") {
            Ok(_) => parse_env("CLIENTELE_PORT", "8080")?,
            Err(_) => parse_env("PORT", "8080")?,
        };

        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            max_connections: parse_env(
                "CLIENTELE_DB_MAX_CONNECTIONS",
                &defaults.max_connections.to_string(),
            )?,
            min_connections: parse_env(
                "CLIENTELE_DB_MIN_CONNECTIONS",
                &defaults.min_connections.to_string(),
            )?,
            acquire_timeout: Duration::from_secs(parse_env(
                "CLIENTELE_DB_ACQUIRE_TIMEOUT_SECS",
                &defaults.acquire_timeout.as_secs().to_string(),
            )?),
            max_lifetime: defaults.max_lifetime,
        };
        if pool.min_connections > pool.max_connections {
            return Err(ConfigError::InvalidEnvVar(
                "CLIENTELE_DB_MIN_CONNECTIONS".to_string(),
                format!(
                    "must not exceed CLIENTELE_DB_MAX_CONNECTIONS ({})",
                    pool.max_connections
                ),
            ));
        }

        let cache_capacity = parse_env(
            "CLIENTELE_CACHE_CAPACITY",
            &Self::DEFAULT_CACHE_CAPACITY.to_string(),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            pool,
            cache_capacity,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
