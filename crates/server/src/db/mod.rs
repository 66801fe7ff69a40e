//! Database operations for the Clientele `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `customers` - Customer records keyed by a generated 10-digit ID, with
//!   unique identity-document columns
//! - `products` - Products owned by a customer (`ON DELETE CASCADE`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p clientele-cli -- migrate
//! ```

pub mod customers;
pub mod id_generator;
pub mod maintenance;
pub mod products;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::config::PoolConfig;

pub use customers::CustomerRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx (connection, transaction or query failure).
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// The database refused a value as malformed or out of range
    /// (SQLSTATE class 22).
    #[error("value rejected by the database: {0}")]
    InvalidData(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique identifier already belongs to another customer.
    #[error("{}", conflict_message(field))]
    Conflict {
        /// Column whose unique constraint was violated.
        field: &'static str,
    },

    /// Every generated customer ID collided with an existing one.
    #[error("failed to generate a unique customer ID after {attempts} attempts")]
    IdSpaceExhausted {
        /// Number of candidates tried.
        attempts: u32,
    },
}

impl RepositoryError {
    /// Classify a write failure, recognising unique-constraint violations.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict {
                field: conflicting_field(db_err.constraint()),
            };
        }
        Self::from(err)
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && is_data_exception(db_err.code().as_deref())
        {
            return Self::InvalidData(db_err.message().to_string());
        }
        Self::Database(err)
    }
}

/// SQLSTATE class 22: the statement was fine, one of its values was not.
fn is_data_exception(code: Option<&str>) -> bool {
    code.is_some_and(|code| code.starts_with("22"))
}

/// Client-facing text for a unique conflict on `field`.
///
/// The customer ID is generated server-side, so a clash there is a lost
/// race the caller can only retry.
pub(crate) fn conflict_message(field: &str) -> String {
    if field == "customer_id" {
        "generated customer_id collided with a concurrent insert; retry the request".to_string()
    } else {
        format!("{field} already belongs to another customer")
    }
}

/// Map a unique constraint name to the field it protects.
fn conflicting_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("customers_pkey") => "customer_id",
        Some("customers_aadhar_id_key") => "aadhar_id",
        Some("customers_passport_id_key") => "passport_id",
        Some("customers_driving_license_id_key") => "driving_license_id",
        _ => "identifier",
    }
}

/// Number of connection attempts made at startup.
pub const CONNECT_ATTEMPTS: u32 = 10;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `limits` - Pool sizing and timeouts
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    limits: &PoolConfig,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(limits.max_connections)
        .min_connections(limits.min_connections)
        .acquire_timeout(limits.acquire_timeout)
        .max_lifetime(limits.max_lifetime)
        .connect(database_url.expose_secret())
        .await
}

/// Delays between startup connection attempts: 1s, 2s, 4s, then 8s.
pub fn backoff_schedule() -> impl Iterator<Item = Duration> {
    std::iter::successors(Some(INITIAL_BACKOFF), |delay| {
        Some((*delay * 2).min(MAX_BACKOFF))
    })
}

/// Create the pool, retrying with exponential backoff while the database
/// comes up.
///
/// Only used at startup; request handling never retries.
///
/// # Errors
///
/// Returns the last `sqlx::Error` once [`CONNECT_ATTEMPTS`] attempts failed.
pub async fn connect_with_retry(
    database_url: &SecretString,
    limits: &PoolConfig,
) -> Result<PgPool, sqlx::Error> {
    let mut delays = backoff_schedule();
    let mut attempt = 1;
    loop {
        match create_pool(database_url, limits).await {
            Ok(pool) => {
                tracing::info!(attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                let delay = delays.next().unwrap_or(MAX_BACKOFF);
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = CONNECT_ATTEMPTS,
                    retry_in_secs = delay.as_secs(),
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
