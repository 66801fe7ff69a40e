//! Input validation errors shared by every entry point.

use thiserror::Error;

use super::email::EmailError;

/// A request was rejected before reaching the store.
///
/// These are caller mistakes: retrying the same input will fail again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A field was present but out of range or malformed.
    #[error("{field} {reason}")]
    InvalidField {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Human-readable rule that failed.
        reason: &'static str,
    },

    /// None of the identity documents were supplied.
    #[error("at least one ID document (aadhar, passport or driving license) is required")]
    MissingIdDocument,

    /// The email address did not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Lookup by an identifier type that does not exist.
    #[error(
        "invalid ID type '{0}', expected one of: customer_id, aadhar, passport, driving_license"
    )]
    UnknownLookupKey(String),
}
