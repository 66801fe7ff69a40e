//! Destructive flush command.
//!
//! Goes through the running server's `POST /api/flush`, so the server drops
//! its cached customers in the same step as the tables.

use reqwest::Client;
use serde_json::Value;

use super::CliError;

/// Server used when neither `--server` nor `CLIENTELE_SERVER_URL` is given.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Base URL from `CLIENTELE_SERVER_URL`, falling back to the local default.
pub fn server_url_from_env() -> String {
    dotenvy::dotenv().ok();
    std::env::var("CLIENTELE_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
}

/// Ask the server at `server_url` to delete every customer and product.
///
/// Returns the server's confirmation message.
///
/// # Errors
///
/// Returns `CliError::NotConfirmed` unless `confirmed` is set,
/// `CliError::Http` if the server cannot be reached, or `CliError::Server`
/// if it answers with an error.
pub async fn run(server_url: &str, confirmed: bool) -> Result<String, CliError> {
    if !confirmed {
        return Err(CliError::NotConfirmed("flush all customer and product data"));
    }

    let url = format!("{}/api/flush", server_url.trim_end_matches('/'));
    tracing::info!(%url, "Requesting flush");

    let response = Client::new().post(&url).send().await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        return Err(CliError::Server {
            status: status.as_u16(),
            message: body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    tracing::info!(%message, "Flush complete");
    Ok(message)
}
