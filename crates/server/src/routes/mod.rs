//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/health                              - Liveness
//! GET    /api/health/ready                        - Store connectivity
//!
//! # Customers
//! POST   /api/customers                           - Create customer
//! GET    /api/customers/all                       - List customers
//! GET    /api/customers/search?type=&value=       - Find by identifier
//! PUT    /api/customers/{customer_id}             - Update customer
//! DELETE /api/customers/{customer_id}             - Delete customer and products
//!
//! # Products
//! POST   /api/products                            - Add product
//! GET    /api/products/{customer_id}              - List a customer's products
//! DELETE /api/products/{customer_id}/{product_id} - Delete product
//!
//! # Maintenance
//! POST   /api/flush                               - Delete everything
//! ```

pub mod customers;
pub mod health;
pub mod maintenance;
pub mod products;

use axum::{
    Router,
    extract::rejection::JsonRejection,
    routing::{delete, get, post, put},
};
use clientele_core::{CustomerId, ProductId};

use crate::error::AppError;
use crate::state::AppState;

/// Create the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/customers", post(customers::create))
        .route("/customers/all", get(customers::list))
        .route("/customers/search", get(customers::search))
        .route(
            "/customers/{customer_id}",
            put(customers::update).delete(customers::delete),
        )
        .route("/products", post(products::create))
        .route("/products/{customer_id}", get(products::list))
        .route("/products/{customer_id}/{product_id}", delete(products::delete))
        .route("/flush", post(maintenance::flush))
}

/// Parse a customer ID path segment.
pub(crate) fn parse_customer_id(raw: &str) -> Result<CustomerId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid customer ID: {raw}")))
}

/// Parse a product ID path segment.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product ID: {raw}")))
}

/// Report an unreadable JSON body as a validation error.
pub(crate) fn json_rejection(rejection: &JsonRejection) -> AppError {
    AppError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
}
