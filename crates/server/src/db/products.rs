//! Product repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use clientele_core::{CustomerId, Price, Product, ProductFields, ProductId};

use super::RepositoryError;

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: ProductId,
    customer_id: CustomerId,
    product_name: String,
    quantity: i32,
    price: Decimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            product_id: row.product_id,
            customer_id: row.customer_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price: Price::from_stored(row.price),
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to an existing customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owning customer does not exist.
    /// Returns `RepositoryError::InvalidData` if the database refuses a value.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        let customer_id = fields.customer_id();
        let mut tx = self.pool.begin().await?;

        let owner_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE customer_id = $1)")
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;
        if !owner_exists {
            return Err(RepositoryError::NotFound(format!("customer {customer_id}")));
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (customer_id, product_name, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING product_id, customer_id, product_name, quantity, price
            ",
        )
        .bind(customer_id)
        .bind(fields.product_name())
        .bind(fields.quantity())
        .bind(fields.price().amount())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            // Owner deleted between the check and the insert.
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound(format!("customer {customer_id}"))
            }
            e => RepositoryError::from(e),
        })?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// List a customer's products in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, customer_id, product_name, quantity, price
            FROM products
            WHERE customer_id = $1
            ORDER BY product_id ASC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Delete a product, only if it belongs to `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product matches both keys.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM products WHERE customer_id = $1 AND product_id = $2")
                .bind(customer_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "product {product_id} for customer {customer_id}"
            )));
        }

        Ok(())
    }
}
