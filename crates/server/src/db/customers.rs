//! Customer repository.
//!
//! Every mutation runs in a single transaction. Update and delete return
//! the identifier snapshot read inside that transaction so callers can
//! invalidate cache keys for the state that no longer exists.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clientele_core::{
    Customer, CustomerFields, CustomerId, Email, IdentifierSnapshot, Lookup, LookupKey,
};

use super::RepositoryError;
use super::id_generator::{generate_customer_id, random_customer_id};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for full customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_id: CustomerId,
    name: String,
    age: i32,
    address: String,
    phone_number: Option<String>,
    email: Option<String>,
    aadhar_id: Option<String>,
    passport_id: Option<String>,
    driving_license_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid email for customer {}: {e}",
                    row.customer_id
                ))
            })?;

        Ok(Self {
            customer_id: row.customer_id,
            name: row.name,
            age: row.age,
            address: row.address,
            phone_number: row.phone_number,
            email,
            aadhar_id: row.aadhar_id,
            passport_id: row.passport_id,
            driving_license_id: row.driving_license_id,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for identifier-only queries.
#[derive(Debug, sqlx::FromRow)]
struct IdentifierRow {
    customer_id: CustomerId,
    aadhar_id: Option<String>,
    passport_id: Option<String>,
    driving_license_id: Option<String>,
}

impl From<IdentifierRow> for IdentifierSnapshot {
    fn from(row: IdentifierRow) -> Self {
        Self {
            customer_id: row.customer_id,
            aadhar_id: row.aadhar_id,
            passport_id: row.passport_id,
            driving_license_id: row.driving_license_id,
        }
    }
}

/// Result of a successful update.
#[derive(Debug, Clone)]
pub struct UpdatedCustomer {
    /// Identifiers the customer had before the update.
    pub previous: IdentifierSnapshot,
    /// Canonical row after the update.
    pub customer: Customer,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a customer under a freshly generated ID.
    ///
    /// ID generation and the insert share one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an identity document already
    /// belongs to another customer.
    /// Returns `RepositoryError::IdSpaceExhausted` if no free ID was found.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, fields: &CustomerFields) -> Result<Customer, RepositoryError> {
        self.create_with(fields, random_customer_id).await
    }

    /// Insert a customer under an ID taken from `draw`.
    ///
    /// Same as [`create`](Self::create) with the candidate source supplied
    /// by the caller. If a concurrent insert claims the candidate after it
    /// was checked, the primary key rejects it and this returns
    /// `RepositoryError::Conflict` for `customer_id`.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub async fn create_with<G>(
        &self,
        fields: &CustomerFields,
        draw: G,
    ) -> Result<Customer, RepositoryError>
    where
        G: FnMut() -> CustomerId + Send,
    {
        let mut tx = self.pool.begin().await?;

        let customer_id = generate_customer_id(&mut *tx, draw).await?;

        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customers (
                customer_id, name, age, address, phone_number, email,
                aadhar_id, passport_id, driving_license_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING customer_id, name, age, address, phone_number, email,
                      aadhar_id, passport_id, driving_license_id, created_at
            ",
        )
        .bind(customer_id)
        .bind(fields.name())
        .bind(fields.age())
        .bind(fields.address())
        .bind(fields.phone_number())
        .bind(fields.email().map(Email::as_str))
        .bind(fields.aadhar_id())
        .bind(fields.passport_id())
        .bind(fields.driving_license_id())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        tx.commit().await?;

        row.try_into()
    }

    /// Replace every attribute of an existing customer.
    ///
    /// The current row is locked and its identifiers captured before the
    /// update, in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this ID.
    /// Returns `RepositoryError::Conflict` if a new identity document
    /// already belongs to another customer.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<UpdatedCustomer, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query_as::<_, IdentifierRow>(
            r"
            SELECT customer_id, aadhar_id, passport_id, driving_license_id
            FROM customers
            WHERE customer_id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("customer {id}")))?;

        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE customers
            SET name = $2, age = $3, address = $4, phone_number = $5, email = $6,
                aadhar_id = $7, passport_id = $8, driving_license_id = $9
            WHERE customer_id = $1
            RETURNING customer_id, name, age, address, phone_number, email,
                      aadhar_id, passport_id, driving_license_id, created_at
            ",
        )
        .bind(id)
        .bind(fields.name())
        .bind(fields.age())
        .bind(fields.address())
        .bind(fields.phone_number())
        .bind(fields.email().map(Email::as_str))
        .bind(fields.aadhar_id())
        .bind(fields.passport_id())
        .bind(fields.driving_license_id())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        tx.commit().await?;

        Ok(UpdatedCustomer {
            previous: previous.into(),
            customer: row.try_into()?,
        })
    }

    /// Delete a customer. Owned products go with it through the
    /// `ON DELETE CASCADE` foreign key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CustomerId) -> Result<IdentifierSnapshot, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, IdentifierRow>(
            r"
            DELETE FROM customers
            WHERE customer_id = $1
            RETURNING customer_id, aadhar_id, passport_id, driving_license_id
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("customer {id}")))?;

        tx.commit().await?;

        Ok(deleted.into())
    }

    /// Find a customer by any of its identifiers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find(&self, lookup: &Lookup) -> Result<Option<Customer>, RepositoryError> {
        let query = match lookup.key {
            LookupKey::CustomerId => {
                let Ok(id) = lookup.value.parse::<CustomerId>() else {
                    return Ok(None);
                };
                sqlx::query_as::<_, CustomerRow>(
                    r"
                    SELECT customer_id, name, age, address, phone_number, email,
                           aadhar_id, passport_id, driving_license_id, created_at
                    FROM customers
                    WHERE customer_id = $1
                    ",
                )
                .bind(id)
            }
            LookupKey::Aadhar => sqlx::query_as::<_, CustomerRow>(
                r"
                SELECT customer_id, name, age, address, phone_number, email,
                       aadhar_id, passport_id, driving_license_id, created_at
                FROM customers
                WHERE aadhar_id = $1
                ",
            )
            .bind(lookup.value.as_str()),
            LookupKey::Passport => sqlx::query_as::<_, CustomerRow>(
                r"
                SELECT customer_id, name, age, address, phone_number, email,
                       aadhar_id, passport_id, driving_license_id, created_at
                FROM customers
                WHERE passport_id = $1
                ",
            )
            .bind(lookup.value.as_str()),
            LookupKey::DrivingLicense => sqlx::query_as::<_, CustomerRow>(
                r"
                SELECT customer_id, name, age, address, phone_number, email,
                       aadhar_id, passport_id, driving_license_id, created_at
                FROM customers
                WHERE driving_license_id = $1
                ",
            )
            .bind(lookup.value.as_str()),
        };

        query
            .fetch_optional(self.pool)
            .await?
            .map(Customer::try_from)
            .transpose()
    }

    /// List every customer, most recently generated ID first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT customer_id, name, age, address, phone_number, email,
                   aadhar_id, passport_id, driving_license_id, created_at
            FROM customers
            ORDER BY customer_id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }
}
