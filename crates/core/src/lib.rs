//! Clientele Core - Shared domain types.
//!
//! This crate provides the types used across all Clientele components:
//! - `server` - JSON API over the customer and product store
//! - `cli` - Command-line tools for migrations and maintenance
//! - `integration-tests` - Database-backed scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no cache clients. Enabling the `postgres` feature adds `sqlx`
//! encoding for the ID and email newtypes.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, email, price, customer and product records,
//!   input drafts and their validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
