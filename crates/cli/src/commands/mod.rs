//! CLI subcommands.

pub mod customers;
pub mod flush;
pub mod migrate;

use clientele_server::db::RepositoryError;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The server could not be reached or sent an unreadable response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error.
    #[error("Server returned {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Output could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A destructive command was run without confirmation.
    #[error("Refusing to {0} without --yes")]
    NotConfirmed(&'static str),
}

/// Database URL from `CLIENTELE_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("CLIENTELE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("CLIENTELE_DATABASE_URL"))
}

/// Open a connection pool for a one-shot command.
pub(crate) async fn connect() -> Result<PgPool, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(url.expose_secret()).await?)
}
