//! Domain models for the API.
//!
//! These types double as the JSON wire representation: the REST surface
//! returns them directly, so serde attributes here define the API contract.

pub mod order;
pub mod product;
pub mod user;

pub use order::{NewOrder, Order, OrderLine};
pub use product::{NewProduct, Product, ProductPatch};
pub use user::User;
