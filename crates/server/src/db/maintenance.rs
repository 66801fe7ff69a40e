//! Destructive maintenance operations.

use sqlx::PgPool;

use super::RepositoryError;

/// Remove every customer and product in one transaction.
///
/// Foreign-key checks are deferred for this transaction only and both
/// tables are truncated together, so there is no session state to restore:
/// a failure at any step rolls back and leaves constraints as they were.
/// Product IDs restart from 1.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement or the commit fails.
pub async fn flush_all(pool: &PgPool) -> Result<(), RepositoryError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET CONSTRAINTS ALL DEFERRED")
        .execute(&mut *tx)
        .await?;

    sqlx::query("TRUNCATE TABLE products, customers RESTART IDENTITY")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::warn!("All customer and product data flushed");
    Ok(())
}
