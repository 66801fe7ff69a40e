//! Maintenance endpoints.

use axum::{Json, extract::State};

use super::customers::MessageResponse;
use crate::error::Result;
use crate::state::AppState;

/// POST /api/flush
///
/// Deletes every customer and product and empties the cache.
///
/// # Errors
///
/// 503 if the store could not be flushed.
pub async fn flush(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.service().flush_all().await?;

    Ok(Json(MessageResponse {
        message: "All customer and product data successfully flushed.".to_string(),
    }))
}
