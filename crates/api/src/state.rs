//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{ApiConfig, OrderPolicy};
use crate::media::MediaStore;
use crate::services::auth::TokenService;
use crate::services::{AuthService, CatalogService, OrderService};
use crate::store::Store;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store and media collaborators are held
/// behind trait objects so tests and local development can swap backends.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaStore>,
    tokens: Arc<TokenService>,
    order_policy: OrderPolicy,
}

impl AppState {
    /// Create application state from collaborators and configuration.
    #[must_use]
    pub fn new(
        config: &ApiConfig,
        store: Arc<dyn Store>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.token_secret,
            config.token_ttl_hours,
        ));

        Self {
            inner: Arc::new(AppStateInner {
                store,
                media,
                tokens,
                order_policy: config.order_policy,
            }),
        }
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.inner.tokens
    }

    /// Build a catalog service over the shared collaborators.
    #[must_use]
    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.inner.store.clone(), self.inner.media.clone())
    }

    /// Build an order service over the shared collaborators.
    #[must_use]
    pub fn orders(&self) -> OrderService {
        OrderService::new(self.inner.store.clone(), self.inner.order_policy)
    }

    /// Build an auth service over the shared collaborators.
    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.inner.store.clone(), self.inner.tokens.clone())
    }
}
