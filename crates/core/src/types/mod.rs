//! Core types for Voltline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod phone;
pub mod slug;
pub mod status;

pub use catalog::{Category, CategoryError, ProductTag, ProductTagError};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use slug::{Slug, SlugError};
pub use status::{OrderStatus, OrderStatusError, Role, RoleError};
