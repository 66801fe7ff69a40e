//! Customer and product operations with cache-aside lookups.
//!
//! Every mutation commits to the store first and touches the cache only
//! after the commit succeeded. Updates and deletes invalidate the keys the
//! record had *before* the mutation, then repopulate from the new record.

use clientele_core::{
    Customer, CustomerDraft, CustomerId, Lookup, Product, ProductDraft, ProductId,
};

use super::error::CustomerError;
use super::store::CustomerStore;
use crate::cache::{CacheBackend, CustomerCache};
use crate::db::customers::UpdatedCustomer;

/// Orchestrates the store and the customer cache.
#[derive(Clone)]
pub struct CustomerService<S, B> {
    store: S,
    cache: CustomerCache<B>,
}

impl<S: CustomerStore, B: CacheBackend> CustomerService<S, B> {
    #[must_use]
    pub const fn new(store: S, cache: CustomerCache<B>) -> Self {
        Self { store, cache }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn cache(&self) -> &CustomerCache<B> {
        &self.cache
    }

    /// Validate and persist a new customer, then cache it under every
    /// identifier it has.
    ///
    /// # Errors
    ///
    /// `Validation` for bad input, `DuplicateIdentifier` if a document ID is
    /// taken, `IdSpaceExhausted` if no free customer ID was found.
    pub async fn create_customer(&self, draft: CustomerDraft) -> Result<Customer, CustomerError> {
        let fields = draft.validate()?;
        let customer = self.store.create_customer(&fields).await?;
        self.cache.put(&customer).await;

        tracing::info!(customer_id = %customer.customer_id, "Customer created");
        Ok(customer)
    }

    /// Replace every mutable field of an existing customer.
    ///
    /// # Errors
    ///
    /// `Validation`, `NotFound` or `DuplicateIdentifier`.
    pub async fn update_customer(
        &self,
        id: CustomerId,
        draft: CustomerDraft,
    ) -> Result<Customer, CustomerError> {
        let fields = draft.validate()?;
        let UpdatedCustomer { previous, customer } =
            self.store.update_customer(id, &fields).await?;

        self.cache.invalidate(&previous).await;
        self.cache.put(&customer).await;

        tracing::info!(customer_id = %id, "Customer updated");
        Ok(customer)
    }

    /// Delete a customer and, through the cascade, their products.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such customer exists.
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), CustomerError> {
        let snapshot = self.store.delete_customer(id).await?;
        self.cache.invalidate(&snapshot).await;

        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    /// Find a customer by a `(type, value)` pair as sent by a client.
    ///
    /// # Errors
    ///
    /// `Validation` for an unknown type or blank value, `NotFound` if no
    /// customer has that identifier.
    pub async fn search(&self, key_type: &str, value: &str) -> Result<Customer, CustomerError> {
        let lookup = Lookup::parse(key_type, value)?;
        self.find_customer(&lookup).await
    }

    /// Cache-aside lookup: a hit never touches the store, a store hit is
    /// written back under all of the customer's identifiers.
    ///
    /// # Errors
    ///
    /// `NotFound` if no customer has that identifier.
    pub async fn find_customer(&self, lookup: &Lookup) -> Result<Customer, CustomerError> {
        if let Some(customer) = self.cache.get(lookup).await {
            return Ok(customer);
        }

        let customer = self
            .store
            .find_customer(lookup)
            .await?
            .ok_or_else(|| CustomerError::NotFound(format!("customer with {}", lookup.key)))?;

        self.cache.put(&customer).await;
        Ok(customer)
    }

    /// Every customer, newest ID first. Always read from the store.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the query fails.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, CustomerError> {
        Ok(self.store.list_customers().await?)
    }

    /// Add a product to an existing customer.
    ///
    /// # Errors
    ///
    /// `Validation` for bad input, `NotFound` if the customer does not exist.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, CustomerError> {
        let fields = draft.validate()?;
        let product = self.store.add_product(&fields).await?;

        tracing::info!(
            customer_id = %product.customer_id,
            product_id = %product.product_id,
            "Product added"
        );
        Ok(product)
    }

    /// Products owned by a customer. Empty if the customer has none or
    /// does not exist.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the query fails.
    pub async fn list_products(&self, customer_id: CustomerId) -> Result<Vec<Product>, CustomerError> {
        Ok(self.store.list_products(customer_id).await?)
    }

    /// Delete one product, which must belong to `customer_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the pair does not match a stored product.
    pub async fn delete_product(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<(), CustomerError> {
        self.store.delete_product(customer_id, product_id).await?;

        tracing::info!(%customer_id, %product_id, "Product deleted");
        Ok(())
    }

    /// Remove all customers and products, then empty the cache.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store could not be flushed; the cache is
    /// left untouched in that case.
    pub async fn flush_all(&self) -> Result<(), CustomerError> {
        self.store.flush_all().await?;
        self.cache.clear().await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use clientele_core::{CustomerFields, IdentifierSnapshot, LookupKey, ProductFields};
    use rust_decimal::Decimal;

    use super::*;
    use crate::cache::{CACHE_TTL, MokaBackend};
    use crate::db::RepositoryError;

    #[derive(Default)]
    struct Tables {
        customers: BTreeMap<CustomerId, Customer>,
        products: Vec<Product>,
        next_customer: i64,
        next_product: i32,
    }

    /// In-memory store with the same uniqueness and cascade rules as the
    /// `PostgreSQL` schema.
    #[derive(Default)]
    struct MemoryStore {
        tables: Mutex<Tables>,
        finds: AtomicUsize,
    }

    impl MemoryStore {
        fn find_calls(&self) -> usize {
            self.finds.load(Ordering::SeqCst)
        }

        fn check_unique(
            tables: &Tables,
            fields: &CustomerFields,
            except: Option<CustomerId>,
        ) -> Result<(), RepositoryError> {
            for other in tables.customers.values() {
                if Some(other.customer_id) == except {
                    continue;
                }
                let clashes = [
                    ("aadhar_id", fields.aadhar_id(), other.aadhar_id.as_deref()),
                    ("passport_id", fields.passport_id(), other.passport_id.as_deref()),
                    (
                        "driving_license_id",
                        fields.driving_license_id(),
                        other.driving_license_id.as_deref(),
                    ),
                ];
                for (field, mine, theirs) in clashes {
                    if mine.is_some() && mine == theirs {
                        return Err(RepositoryError::Conflict { field });
                    }
                }
            }
            Ok(())
        }
    }

    impl CustomerStore for MemoryStore {
        async fn create_customer(&self, fields: &CustomerFields) -> Result<Customer, RepositoryError> {
            let mut tables = self.tables.lock().unwrap();
            Self::check_unique(&tables, fields, None)?;
            tables.next_customer += 1;
            let id = CustomerId::new(CustomerId::MIN + tables.next_customer);
            let customer = fields.clone().into_customer(id, Utc::now());
            tables.customers.insert(id, customer.clone());
            Ok(customer)
        }

        async fn update_customer(
            &self,
            id: CustomerId,
            fields: &CustomerFields,
        ) -> Result<UpdatedCustomer, RepositoryError> {
            let mut tables = self.tables.lock().unwrap();
            let existing = tables
                .customers
                .get(&id)
                .ok_or_else(|| RepositoryError::NotFound(format!("customer {id}")))?;
            let previous = existing.identifiers();
            let created_at = existing.created_at;
            Self::check_unique(&tables, fields, Some(id))?;
            let customer = fields.clone().into_customer(id, created_at);
            tables.customers.insert(id, customer.clone());
            Ok(UpdatedCustomer { previous, customer })
        }

        async fn delete_customer(&self, id: CustomerId) -> Result<IdentifierSnapshot, RepositoryError> {
            let mut tables = self.tables.lock().unwrap();
            let removed = tables
                .customers
                .remove(&id)
                .ok_or_else(|| RepositoryError::NotFound(format!("customer {id}")))?;
            tables.products.retain(|p| p.customer_id != id);
            Ok(removed.identifiers())
        }

        async fn find_customer(&self, lookup: &Lookup) -> Result<Option<Customer>, RepositoryError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            let tables = self.tables.lock().unwrap();
            let found = tables.customers.values().find(|c| {
                let value = Some(lookup.value.as_str());
                match lookup.key {
                    LookupKey::CustomerId => c.customer_id.to_string() == lookup.value,
                    LookupKey::Aadhar => c.aadhar_id.as_deref() == value,
                    LookupKey::Passport => c.passport_id.as_deref() == value,
                    LookupKey::DrivingLicense => c.driving_license_id.as_deref() == value,
                }
            });
            Ok(found.cloned())
        }

        async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
            let tables = self.tables.lock().unwrap();
            Ok(tables.customers.values().rev().cloned().collect())
        }

        async fn add_product(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
            let mut tables = self.tables.lock().unwrap();
            if !tables.customers.contains_key(&fields.customer_id()) {
                return Err(RepositoryError::NotFound(format!(
                    "customer {}",
                    fields.customer_id()
                )));
            }
            tables.next_product += 1;
            let product = fields.clone().into_product(ProductId::new(tables.next_product));
            tables.products.push(product.clone());
            Ok(product)
        }

        async fn list_products(&self, customer_id: CustomerId) -> Result<Vec<Product>, RepositoryError> {
            let tables = self.tables.lock().unwrap();
            Ok(tables
                .products
                .iter()
                .filter(|p| p.customer_id == customer_id)
                .cloned()
                .collect())
        }

        async fn delete_product(
            &self,
            customer_id: CustomerId,
            product_id: ProductId,
        ) -> Result<(), RepositoryError> {
            let mut tables = self.tables.lock().unwrap();
            let before = tables.products.len();
            tables
                .products
                .retain(|p| !(p.customer_id == customer_id && p.product_id == product_id));
            if tables.products.len() == before {
                return Err(RepositoryError::NotFound(format!("product {product_id}")));
            }
            Ok(())
        }

        async fn flush_all(&self) -> Result<(), RepositoryError> {
            let mut tables = self.tables.lock().unwrap();
            tables.customers.clear();
            tables.products.clear();
            tables.next_product = 0;
            Ok(())
        }
    }

    fn service() -> CustomerService<MemoryStore, MokaBackend> {
        CustomerService::new(
            MemoryStore::default(),
            CustomerCache::new(MokaBackend::new(1_000, CACHE_TTL)),
        )
    }

    fn jane() -> CustomerDraft {
        CustomerDraft {
            name: "Jane Doe".to_string(),
            age: Some(30),
            address: "123 Main St".to_string(),
            aadhar_id: Some("123456789012".to_string()),
            ..CustomerDraft::default()
        }
    }

    fn laptop(customer_id: CustomerId) -> ProductDraft {
        ProductDraft {
            customer_id: Some(customer_id),
            product_name: "Laptop".to_string(),
            quantity: Some(1),
            price: Some(Decimal::new(1200, 0)),
        }
    }

    #[tokio::test]
    async fn test_create_then_find_by_every_identifier() {
        let service = service();
        let created = service.create_customer(jane()).await.unwrap();
        assert!(created.customer_id.is_ten_digits());

        let by_id = service
            .search("customer_id", &created.customer_id.to_string())
            .await
            .unwrap();
        let by_aadhar = service.search("aadhar", "123456789012").await.unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_aadhar, created);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let service = service();
        let created = service.create_customer(jane()).await.unwrap();

        service.search("aadhar", "123456789012").await.unwrap();
        service
            .search("customer_id", &created.customer_id.to_string())
            .await
            .unwrap();
        assert_eq!(service.store().find_calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_populates_all_keys() {
        let service = service();
        let created = service.create_customer(jane()).await.unwrap();
        service.cache().clear().await;

        service.search("aadhar", "123456789012").await.unwrap();
        assert_eq!(service.store().find_calls(), 1);

        // Written back under the primary key as well.
        service
            .find_customer(&Lookup::customer_id(created.customer_id))
            .await
            .unwrap();
        assert_eq!(service.store().find_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_rejects_bad_input() {
        let service = service();
        let err = service.search("pan_card", "ABCDE1234F").await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let err = service.search("aadhar", "   ").await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(service.store().find_calls(), 0);
    }

    #[tokio::test]
    async fn test_search_unknown_value_is_not_found() {
        let service = service();
        let err = service.search("passport", "NOPE").await.unwrap_err();
        assert!(matches!(err, CustomerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_identifier_keys() {
        let service = service();
        let created = service.create_customer(jane()).await.unwrap();

        let mut draft = jane();
        draft.aadhar_id = None;
        draft.passport_id = Some("P1234567".to_string());
        draft.address = "456 Oak Ave".to_string();
        let updated = service
            .update_customer(created.customer_id, draft)
            .await
            .unwrap();
        assert_eq!(updated.created_at, created.created_at);

        let err = service.search("aadhar", "123456789012").await.unwrap_err();
        assert!(matches!(err, CustomerError::NotFound(_)));

        let by_passport = service.search("passport", "P1234567").await.unwrap();
        let by_id = service
            .find_customer(&Lookup::customer_id(created.customer_id))
            .await
            .unwrap();
        assert_eq!(by_passport, updated);
        assert_eq!(by_id.address, "456 Oak Ave");
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let service = service();
        let err = service
            .update_customer(CustomerId::new(1_111_111_111), jane())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_update_validation_happens_before_store() {
        let service = service();
        let created = service.create_customer(jane()).await.unwrap();

        let mut draft = jane();
        draft.aadhar_id = Some("  ".to_string());
        let err = service
            .update_customer(created.customer_id, draft)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let unchanged = service.search("aadhar", "123456789012").await.unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn test_duplicate_document_is_rejected() {
        let service = service();
        service.create_customer(jane()).await.unwrap();

        let mut john = jane();
        john.name = "John Roe".to_string();
        let err = service.create_customer(john).await.unwrap_err();
        assert!(matches!(
            err,
            CustomerError::DuplicateIdentifier { field: "aadhar_id" }
        ));
        assert_eq!(service.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_invalidates_every_key_and_cascades() {
        let service = service();
        let mut draft = jane();
        draft.driving_license_id = Some("DL-0420110012345".to_string());
        let created = service.create_customer(draft).await.unwrap();
        service.add_product(laptop(created.customer_id)).await.unwrap();

        service.delete_customer(created.customer_id).await.unwrap();

        for (key, value) in [
            ("customer_id", created.customer_id.to_string()),
            ("aadhar", "123456789012".to_string()),
            ("driving_license", "DL-0420110012345".to_string()),
        ] {
            let err = service.search(key, &value).await.unwrap_err();
            assert!(matches!(err, CustomerError::NotFound(_)), "{key} still found");
        }
        assert!(
            service
                .list_products(created.customer_id)
                .await
                .unwrap()
                .is_empty()
        );

        let err = service
            .delete_customer(created.customer_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let service = service();
        let created = service.create_customer(jane()).await.unwrap();

        let product = service.add_product(laptop(created.customer_id)).await.unwrap();
        assert_eq!(product.price.to_string(), "1200.00");

        let listed = service.list_products(created.customer_id).await.unwrap();
        assert_eq!(listed, vec![product.clone()]);

        let err = service
            .delete_product(CustomerId::new(1_111_111_111), product.product_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");

        service
            .delete_product(created.customer_id, product.product_id)
            .await
            .unwrap();
        assert!(service.list_products(created.customer_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_for_missing_customer() {
        let service = service();
        let err = service
            .add_product(laptop(CustomerId::new(1_111_111_111)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_flush_empties_store_and_cache() {
        let service = service();
        let created = service.create_customer(jane()).await.unwrap();
        service.add_product(laptop(created.customer_id)).await.unwrap();

        service.flush_all().await.unwrap();

        assert!(service.list_customers().await.unwrap().is_empty());
        let err = service.search("aadhar", "123456789012").await.unwrap_err();
        assert!(matches!(err, CustomerError::NotFound(_)));
        assert_eq!(service.store().find_calls(), 1);
    }
}
