//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"error": <message>, "kind": <kind>}` with the status matching the kind.
//! Server-side failures are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::CustomerError;

/// Application-level error type for the HTTP surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// Customer or product operation failed.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Malformed request that never reached a service.
    #[error("{0}")]
    BadRequest(String),
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Customer(err) => match err {
                CustomerError::Validation(_) | CustomerError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                CustomerError::DuplicateIdentifier { .. } => StatusCode::CONFLICT,
                CustomerError::NotFound(_) => StatusCode::NOT_FOUND,
                CustomerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CustomerError::IdSpaceExhausted { .. } | CustomerError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Machine-readable kind reported to clients.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Customer(err) => err.kind(),
            Self::BadRequest(_) => "validation_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                kind = self.kind(),
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Customer(CustomerError::StoreUnavailable(_)) => {
                "Store temporarily unavailable".to_string()
            }
            Self::Customer(CustomerError::DataCorruption(_)) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error: message,
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use clientele_core::ValidationError;

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(CustomerError::from(ValidationError::MissingField("name")).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CustomerError::DuplicateIdentifier { field: "passport_id" }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CustomerError::NotFound("customer 1".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CustomerError::IdSpaceExhausted { attempts: 5 }.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CustomerError::StoreUnavailable(sqlx::Error::PoolTimedOut).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AppError::BadRequest("bad id".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CustomerError::InvalidInput("numeric field overflow".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_body_carries_message_and_kind() {
        let response =
            AppError::from(CustomerError::DuplicateIdentifier { field: "aadhar_id" }).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "duplicate_identifier");
        assert_eq!(body["error"], "aadhar_id already belongs to another customer");
    }

    #[tokio::test]
    async fn test_store_details_are_hidden() {
        let response =
            AppError::from(CustomerError::StoreUnavailable(sqlx::Error::PoolTimedOut)).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "store_unavailable");
        assert_eq!(body["error"], "Store temporarily unavailable");
    }
}
