//! Cache-aside copies of customer records.
//!
//! A customer is stored once per identifier it can be looked up by, under
//! `customer:{type}:{value}` keys (`customer_id`, `aadhar`, `passport`,
//! `driving_license`). The store stays the source of truth: every backend
//! failure is logged and treated as a miss or a no-op.

mod backend;

use std::time::Duration;

use clientele_core::{Customer, IdentifierSnapshot, Lookup, LookupKey};

pub use backend::{CacheBackend, CacheError, MokaBackend};

/// How long a cached customer stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache key for one identifier of a customer.
#[must_use]
pub fn cache_key(key: LookupKey, value: &str) -> String {
    format!("customer:{key}:{value}")
}

/// Multi-key customer cache over a [`CacheBackend`].
#[derive(Clone)]
pub struct CustomerCache<B> {
    backend: B,
}

impl<B: CacheBackend> CustomerCache<B> {
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Store `customer` under every identifier it currently has,
    /// overwriting earlier entries.
    pub async fn put(&self, customer: &Customer) {
        let payload = match serde_json::to_string(customer) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    customer_id = %customer.customer_id,
                    error = %CacheError::from(e),
                    "Skipping cache write"
                );
                return;
            }
        };

        for lookup in customer.identifiers().lookups() {
            let key = cache_key(lookup.key, &lookup.value);
            if let Err(e) = self.backend.set(key, payload.clone()).await {
                tracing::warn!(
                    customer_id = %customer.customer_id,
                    key_type = %lookup.key,
                    error = %e,
                    "Cache write failed"
                );
            }
        }
    }

    /// Cached customer for `lookup`, or `None` on a miss or backend failure.
    pub async fn get(&self, lookup: &Lookup) -> Option<Customer> {
        let key = cache_key(lookup.key, &lookup.value);
        let raw = match self.backend.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key_type = %lookup.key, error = %e, "Cache read failed");
                return None;
            }
        };

        match serde_json::from_str::<Customer>(&raw) {
            Ok(customer) => {
                tracing::debug!(key_type = %lookup.key, "Cache hit");
                Some(customer)
            }
            Err(e) => {
                tracing::warn!(key_type = %lookup.key, error = %e, "Evicting undecodable cache entry");
                self.delete_key(&key).await;
                None
            }
        }
    }

    /// Remove the entries for every identifier in `snapshot`.
    ///
    /// Pass the identifiers as they were before the mutation; the new record
    /// cannot tell which keys used to point at it.
    pub async fn invalidate(&self, snapshot: &IdentifierSnapshot) {
        for lookup in snapshot.lookups() {
            self.delete_key(&cache_key(lookup.key, &lookup.value)).await;
        }
        tracing::debug!(customer_id = %snapshot.customer_id, "Cache entries invalidated");
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        if let Err(e) = self.backend.flush().await {
            tracing::warn!(error = %e, "Cache flush failed");
        }
    }

    async fn delete_key(&self, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            tracing::warn!(error = %e, "Cache delete failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use clientele_core::CustomerId;

    use super::*;

    fn customer() -> Customer {
        Customer {
            customer_id: CustomerId::new(1_234_567_890),
            name: "Jane Doe".to_string(),
            age: 30,
            address: "123 Main St".to_string(),
            phone_number: None,
            email: None,
            aadhar_id: Some("123456789012".to_string()),
            passport_id: Some("P7654321".to_string()),
            driving_license_id: None,
            created_at: Utc::now(),
        }
    }

    fn moka_cache() -> CustomerCache<MokaBackend> {
        CustomerCache::new(MokaBackend::new(100, CACHE_TTL))
    }

    /// Backend that fails every call.
    struct Unreachable;

    impl CacheBackend for Unreachable {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: String, _value: String) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn flush(&self) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(
            cache_key(LookupKey::DrivingLicense, "DL-1"),
            "customer:driving_license:DL-1"
        );
        assert_eq!(
            cache_key(LookupKey::CustomerId, "1234567890"),
            "customer:customer_id:1234567890"
        );
    }

    #[tokio::test]
    async fn test_put_indexes_every_present_identifier() {
        let cache = moka_cache();
        let jane = customer();
        cache.put(&jane).await;

        for (key, value) in [
            (LookupKey::CustomerId, "1234567890"),
            (LookupKey::Aadhar, "123456789012"),
            (LookupKey::Passport, "P7654321"),
        ] {
            let hit = cache.get(&Lookup::parse(key.as_str(), value).unwrap()).await;
            assert_eq!(hit.as_ref(), Some(&jane), "missing {key}");
        }

        let absent = Lookup {
            key: LookupKey::DrivingLicense,
            value: "DL-1".to_string(),
        };
        assert!(cache.get(&absent).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_uses_snapshot_keys() {
        let cache = moka_cache();
        let before = customer();
        cache.put(&before).await;

        // The record now has a different passport; invalidating with the new
        // identifiers would leave the old passport key behind.
        let mut after = before.clone();
        after.passport_id = Some("P0000001".to_string());
        cache.invalidate(&before.identifiers()).await;
        cache.put(&after).await;

        let old_passport = Lookup::parse("passport", "P7654321").unwrap();
        assert!(cache.get(&old_passport).await.is_none());
        let new_passport = Lookup::parse("passport", "P0000001").unwrap();
        assert_eq!(cache.get(&new_passport).await, Some(after));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss_and_evicted() {
        let cache = moka_cache();
        let key = cache_key(LookupKey::Aadhar, "999");
        cache
            .backend()
            .set(key.clone(), "{not json".to_string())
            .await
            .unwrap();

        let lookup = Lookup::parse("aadhar", "999").unwrap();
        assert!(cache.get(&lookup).await.is_none());
        assert_eq!(cache.backend().get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = moka_cache();
        let jane = customer();
        cache.put(&jane).await;
        cache.clear().await;
        assert!(cache.get(&Lookup::customer_id(jane.customer_id)).await.is_none());
    }

    #[tokio::test]
    async fn test_backend_failures_are_swallowed() {
        let cache = CustomerCache::new(Unreachable);
        let jane = customer();
        cache.put(&jane).await;
        assert!(cache.get(&Lookup::customer_id(jane.customer_id)).await.is_none());
        cache.invalidate(&jane.identifiers()).await;
        cache.clear().await;
    }
}
