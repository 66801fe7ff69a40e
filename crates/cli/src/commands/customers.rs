//! Customer inspection commands.

use clientele_server::db::CustomerRepository;

use super::{CliError, connect};

/// Print every customer as pretty JSON on stdout.
///
/// # Errors
///
/// Returns `CliError` if the query fails.
pub async fn list() -> Result<(), CliError> {
    let pool = connect().await?;
    let customers = CustomerRepository::new(&pool).list().await?;

    tracing::info!(count = customers.len(), "Fetched customers");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&customers)?);
    }
    Ok(())
}
