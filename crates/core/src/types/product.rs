//! Products owned by a customer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CustomerId, ProductId};
use super::customer::reject_nul;
use super::price::Price;
use super::validation::ValidationError;

/// A stored product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Price,
}

/// Unvalidated product input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub customer_id: Option<CustomerId>,
    pub product_name: String,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
}

impl ProductDraft {
    /// Check the draft and produce fields the store will accept.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(self) -> Result<ProductFields, ValidationError> {
        let customer_id = self
            .customer_id
            .ok_or(ValidationError::MissingField("customer_id"))?;
        if customer_id.get() <= 0 {
            return Err(ValidationError::InvalidField {
                field: "customer_id",
                reason: "must be a positive customer ID",
            });
        }

        let product_name = self.product_name.trim();
        if product_name.is_empty() {
            return Err(ValidationError::MissingField("product_name"));
        }
        reject_nul(product_name, "product_name")?;

        let quantity = self
            .quantity
            .ok_or(ValidationError::MissingField("quantity"))?;
        if quantity <= 0 {
            return Err(ValidationError::InvalidField {
                field: "quantity",
                reason: "must be greater than zero",
            });
        }

        let price = Price::new(self.price.ok_or(ValidationError::MissingField("price"))?)?;

        Ok(ProductFields {
            customer_id,
            product_name: product_name.to_owned(),
            quantity,
            price,
        })
    }
}

/// Product attributes that passed [`ProductDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    customer_id: CustomerId,
    product_name: String,
    quantity: i32,
    price: Price,
}

impl ProductFields {
    #[must_use]
    pub const fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    #[must_use]
    pub const fn quantity(&self) -> i32 {
        self.quantity
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Build the record the store would hold for these fields.
    #[must_use]
    pub fn into_product(self, product_id: ProductId) -> Product {
        Product {
            product_id,
            customer_id: self.customer_id,
            product_name: self.product_name,
            quantity: self.quantity,
            price: self.price,
        }
    }
}
