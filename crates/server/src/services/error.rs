//! Errors surfaced by customer and product operations.

use clientele_core::ValidationError;
use thiserror::Error;

use crate::db::{RepositoryError, conflict_message};

/// Failure of a customer or product operation.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Missing or invalid input; the caller must fix the request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store refused a value that passed validation.
    #[error("{0}")]
    InvalidInput(String),

    /// A unique identifier is already taken by another customer, or a
    /// generated customer ID lost a race with a concurrent insert.
    #[error("{}", conflict_message(field))]
    DuplicateIdentifier {
        /// Field whose value conflicted.
        field: &'static str,
    },

    /// No record matched.
    #[error("{0} not found")]
    NotFound(String),

    /// ID generation kept colliding. Operators should be alerted.
    #[error("failed to generate a unique customer ID after {attempts} attempts")]
    IdSpaceExhausted {
        /// Number of candidates tried.
        attempts: u32,
    },

    /// The store failed (connection, transaction or query). Retryable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),

    /// The store returned data that violates an invariant.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl CustomerError {
    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => "validation_error",
            Self::DuplicateIdentifier { .. } => "duplicate_identifier",
            Self::NotFound(_) => "not_found",
            Self::IdSpaceExhausted { .. } => "id_space_exhausted",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::DataCorruption(_) => "internal",
        }
    }
}

impl From<RepositoryError> for CustomerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => Self::StoreUnavailable(e),
            RepositoryError::InvalidData(msg) => Self::InvalidInput(msg),
            RepositoryError::DataCorruption(msg) => Self::DataCorruption(msg),
            RepositoryError::NotFound(what) => Self::NotFound(what),
            RepositoryError::Conflict { field } => Self::DuplicateIdentifier { field },
            RepositoryError::IdSpaceExhausted { attempts } => Self::IdSpaceExhausted { attempts },
        }
    }
}
