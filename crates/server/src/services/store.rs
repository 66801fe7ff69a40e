//! The record store as seen by the customer service.

use std::future::Future;

use sqlx::PgPool;

use clientele_core::{
    Customer, CustomerFields, CustomerId, IdentifierSnapshot, Lookup, Product, ProductFields,
    ProductId,
};

use crate::db::customers::UpdatedCustomer;
use crate::db::{CustomerRepository, ProductRepository, RepositoryError, maintenance};

/// Transactional customer and product storage.
///
/// Implementations must make each mutation atomic and report unique
/// identifier conflicts as `RepositoryError::Conflict`.
pub trait CustomerStore: Send + Sync {
    fn create_customer(
        &self,
        fields: &CustomerFields,
    ) -> impl Future<Output = Result<Customer, RepositoryError>> + Send;

    fn update_customer(
        &self,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> impl Future<Output = Result<UpdatedCustomer, RepositoryError>> + Send;

    fn delete_customer(
        &self,
        id: CustomerId,
    ) -> impl Future<Output = Result<IdentifierSnapshot, RepositoryError>> + Send;

    fn find_customer(
        &self,
        lookup: &Lookup,
    ) -> impl Future<Output = Result<Option<Customer>, RepositoryError>> + Send;

    fn list_customers(&self) -> impl Future<Output = Result<Vec<Customer>, RepositoryError>> + Send;

    fn add_product(
        &self,
        fields: &ProductFields,
    ) -> impl Future<Output = Result<Product, RepositoryError>> + Send;

    fn list_products(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    fn delete_product(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn flush_all(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// `PostgreSQL`-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CustomerStore for PgStore {
    async fn create_customer(&self, fields: &CustomerFields) -> Result<Customer, RepositoryError> {
        CustomerRepository::new(&self.pool).create(fields).await
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<UpdatedCustomer, RepositoryError> {
        CustomerRepository::new(&self.pool).update(id, fields).await
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<IdentifierSnapshot, RepositoryError> {
        CustomerRepository::new(&self.pool).delete(id).await
    }

    async fn find_customer(&self, lookup: &Lookup) -> Result<Option<Customer>, RepositoryError> {
        CustomerRepository::new(&self.pool).find(lookup).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        CustomerRepository::new(&self.pool).list().await
    }

    async fn add_product(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        ProductRepository::new(&self.pool).add(fields).await
    }

    async fn list_products(&self, customer_id: CustomerId) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool)
            .list_for_customer(customer_id)
            .await
    }

    async fn delete_product(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        ProductRepository::new(&self.pool)
            .delete(customer_id, product_id)
            .await
    }

    async fn flush_all(&self) -> Result<(), RepositoryError> {
        maintenance::flush_all(&self.pool).await
    }
}
