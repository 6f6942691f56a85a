//! Voltline Core - Shared types library.
//!
//! This crate provides common types used across all Voltline components:
//! - `api` - REST backend (catalog, orders, auth, search)
//! - `client` - Browser-side flows (cart, checkout, admin console)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, phones, slugs,
//!   and the catalog/order/role enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
