//! Business logic services.
//!
//! # Services
//!
//! - `customers` - Customer and product operations over the store and cache
//! - `store` - The [`CustomerStore`] seam and its `PostgreSQL` implementation

pub mod customers;
pub mod error;
pub mod store;

pub use customers::CustomerService;
pub use error::CustomerError;
pub use store::{CustomerStore, PgStore};
