//! Database migration command.
//!
//! Applies the migrations in `crates/server/migrations/`, which are
//! embedded at build time.
//!
//! # Environment Variables
//!
//! - `CLIENTELE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use super::{CliError, connect};

/// Run pending migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
