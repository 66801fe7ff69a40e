//! Domain types for Clientele.
//!
//! This module provides type-safe wrappers and the record shapes exchanged
//! between the store, the cache, and clients.

pub mod customer;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod validation;

pub use customer::{
    Customer, CustomerDraft, CustomerFields, IdentifierSnapshot, Lookup, LookupKey,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{Product, ProductDraft, ProductFields};
pub use validation::ValidationError;
