//! Persistent document store collaborator.
//!
//! The store owns Product, Order, and User documents and exposes CRUD plus
//! field-based queries. Services depend on the traits here, never on a
//! concrete backend, so the boundary stays explicit:
//!
//! - [`postgres::PgStore`] - production backend (`PostgreSQL` via sqlx)
//! - [`memory::MemoryStore`] - in-process backend for tests and local
//!   development
//!
//! Concurrent writes are resolved by the backend's native semantics:
//! last-writer-wins on a given id, unique-index violations surfacing as
//! [`StoreError::Conflict`]. No locking or cross-entity transactions.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use voltline_core::{Category, Email, OrderId, OrderStatus, ProductId, Role, UserId};

use crate::models::{NewOrder, NewProduct, Order, Product, ProductPatch, User};

pub use memory::MemoryStore;
pub use postgres::{PgStore, create_pool};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug or email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Product document operations.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new product and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the slug is already taken.
    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id is absent and
    /// `StoreError::Conflict` if a recomputed slug collides.
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError>;

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id is absent.
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;

    /// Look up a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError>;

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// List every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// List products in one category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn list_products_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Product>, StoreError>;

    /// Case-insensitive substring search over name and description.
    ///
    /// An empty query matches everything; no match is an empty vec, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, StoreError>;

    /// Atomically subtract `quantity` from a product's stock.
    ///
    /// Returns `false` without modifying anything if the product has fewer
    /// than `quantity` units on hand.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id is absent.
    async fn decrement_stock(&self, id: ProductId, quantity: i32) -> Result<bool, StoreError>;
}

/// Order document operations.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the write fails.
    async fn insert_order(&self, new: NewOrder) -> Result<Order, StoreError>;

    /// Look up an order by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// List orders owned by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// List every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Overwrite an order's status and return the updated order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id is absent.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreError>;
}

/// User document operations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    async fn insert_user(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError>;

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    async fn user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, StoreError>;

    /// Overwrite a user's role and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id is absent.
    async fn set_role(&self, id: UserId, role: Role) -> Result<User, StoreError>;
}

/// The full document store: all three entity stores behind one object.
pub trait Store: ProductStore + OrderStore + UserStore {}

impl<T: ProductStore + OrderStore + UserStore> Store for T {}
