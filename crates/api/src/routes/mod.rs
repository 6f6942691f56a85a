//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (in main)
//!
//! # Auth
//! POST /auth/register           - Register a user account
//! POST /auth/login              - Login, returns user + bearer token
//! POST /auth/admin/register     - Register an admin account (admin)
//! PUT  /auth/toggle-role        - Set a user's role (admin)
//!
//! # Products
//! GET  /products                - List all products
//! POST /products                - Create product (admin, multipart)
//! GET  /products/{slug}         - Product by slug
//! PUT  /products/{id}           - Update product (admin, multipart)
//! DELETE /products/{id}         - Delete product (admin)
//! GET  /products/categories/{category} - Filter by category
//!
//! # Search
//! GET  /search?q=...            - Substring search over name/description
//!
//! # Orders
//! POST /orders                  - Create order (guest or authenticated)
//! GET  /orders                  - Own orders (authenticated)
//! GET  /orders/all              - All orders (admin)
//! PUT  /orders/{id}             - Update order status (admin)
//! ```

pub mod auth;
pub mod orders;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/admin/register", post(auth::register_admin))
        .route("/toggle-role", put(auth::toggle_role))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/categories/{category}", get(products::by_category))
        .route(
            "/{slug}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list_own))
        .route("/all", get(orders::list_all))
        .route("/{id}", put(orders::update_status))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .route("/search", get(search::search))
}
