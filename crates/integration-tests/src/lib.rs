//! Integration tests for Voltline.
//!
//! Each test builds the real API router over an in-memory store, serves
//! it on an ephemeral port, and drives it over HTTP - with raw `reqwest`
//! for surface-level assertions and with the `voltline-client` crate for
//! the browser-flow scenarios.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p voltline-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;

use voltline_api::config::{ApiConfig, OrderPolicy};
use voltline_api::media::NullMediaStore;
use voltline_api::services::auth::hash_password;
use voltline_api::state::AppState;
use voltline_api::store::{MemoryStore, UserStore};
use voltline_client::ApiClient;
use voltline_core::{Email, Role};

/// Email for the admin account every context starts with.
pub const ADMIN_EMAIL: &str = "admin@voltline.test";
/// Password for the seeded admin account.
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// A running API server over an in-memory store, plus clients for it.
pub struct TestContext {
    /// Base URL of the spawned server.
    pub base_url: String,
    /// Raw HTTP client.
    pub http: reqwest::Client,
    /// Typed client from the `voltline-client` crate.
    pub api: ApiClient,
    /// The store backing the server, for direct state assertions.
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    /// Spawn a server with the default order policy.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be spawned; tests have no graceful
    /// degradation path for that.
    pub async fn new() -> Self {
        Self::with_policy(OrderPolicy::default()).await
    }

    /// Spawn a server with an explicit order policy.
    ///
    /// The store is seeded with one admin account
    /// ([`ADMIN_EMAIL`]/[`ADMIN_PASSWORD`]); the admin-only surface is
    /// unreachable otherwise, since registration only creates users.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be spawned.
    #[allow(clippy::unwrap_used, clippy::expect_used)]
    pub async fn with_policy(order_policy: OrderPolicy) -> Self {
        let config = test_config(order_policy);
        let store = Arc::new(MemoryStore::new());

        let admin_email = Email::parse(ADMIN_EMAIL).expect("valid literal");
        let password_hash = hash_password(ADMIN_PASSWORD).expect("hashing succeeds");
        store
            .insert_user("Admin", &admin_email, &password_hash, Role::Admin)
            .await
            .expect("seeding admin succeeds");

        let state = AppState::new(&config, store.clone(), Arc::new(NullMediaStore));
        let app = voltline_api::app(state);

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server runs");
        });

        let base_url = format!("http://{addr}");
        Self {
            http: reqwest::Client::new(),
            api: ApiClient::new(&base_url),
            base_url,
            store,
        }
    }

    /// Login as the seeded admin and return the bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the login fails.
    #[allow(clippy::unwrap_used)]
    pub async fn admin_token(&self) -> String {
        self.api
            .login(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap()
            .token
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Build a config for tests; the database URL is never dialed because the
/// store is in-memory.
fn test_config(order_policy: OrderPolicy) -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        token_secret: SecretString::from("kX9#mP2$vL5@qR8!wT3^zN6&yB4*uE7c"),
        token_ttl_hours: 24,
        media_dir: "uploads".to_owned(),
        order_policy,
        sentry_dsn: None,
    }
}

/// Multipart form data for a valid product, varying the name.
#[must_use]
pub fn product_form(name: &str) -> voltline_client::api::ProductFormData {
    voltline_client::api::ProductFormData {
        name: Some(name.to_owned()),
        category: Some("smartphones".to_owned()),
        price: Some("999".to_owned()),
        stock: Some("5".to_owned()),
        description: Some("Integration test product".to_owned()),
        image: Some(("product.jpg".to_owned(), vec![0xFF, 0xD8, 0xFF])),
        ..Default::default()
    }
}
