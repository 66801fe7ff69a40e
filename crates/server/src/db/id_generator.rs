//! Customer ID generation.
//!
//! IDs are random 10-digit integers. Each candidate is checked against the
//! `customers` table on the connection that will perform the insert; the
//! primary key still rejects a candidate that races in between.

use std::future::Future;

use sqlx::PgConnection;

use clientele_core::CustomerId;

use super::RepositoryError;

/// Candidates drawn before giving up.
pub const MAX_ATTEMPTS: u32 = 5;

/// Answers whether a customer ID is already taken.
pub trait IdProbe {
    fn id_exists(
        &mut self,
        id: CustomerId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

impl IdProbe for PgConnection {
    async fn id_exists(&mut self, id: CustomerId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE customer_id = $1)")
                .bind(id)
                .fetch_one(&mut *self)
                .await?;
        Ok(exists)
    }
}

/// Draw a uniformly random ID in `[CustomerId::MIN, CustomerId::MAX]`.
#[must_use]
pub fn random_customer_id() -> CustomerId {
    CustomerId::new(rand::random_range(CustomerId::MIN..=CustomerId::MAX))
}

/// Find an unused customer ID.
///
/// # Errors
///
/// Returns `RepositoryError::IdSpaceExhausted` after [`MAX_ATTEMPTS`]
/// collisions, or the probe's error if the existence check fails.
pub async fn generate_customer_id<P, G>(
    probe: &mut P,
    mut draw: G,
) -> Result<CustomerId, RepositoryError>
where
    P: IdProbe + Send,
    G: FnMut() -> CustomerId + Send,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = draw();
        if !probe.id_exists(candidate).await? {
            return Ok(candidate);
        }
        tracing::warn!(
            customer_id = %candidate,
            attempt,
            "Generated customer ID already exists, retrying"
        );
    }

    tracing::error!(
        attempts = MAX_ATTEMPTS,
        "Customer ID generation exhausted its retries"
    );
    Err(RepositoryError::IdSpaceExhausted {
        attempts: MAX_ATTEMPTS,
    })
}
