//! The client-side auth session.
//!
//! An explicit context object rather than an ambient auth store: views
//! that depend on the signed-in user receive an `AuthSession`, and nothing
//! reads it before [`AuthSession::initialize`] has restored state from
//! local storage.

use std::sync::Arc;

use crate::api::{ApiClient, User};
use crate::error::ClientError;
use crate::storage::Storage;

/// Storage keys for the persisted session.
const USER_KEY: &str = "user";
const TOKEN_KEY: &str = "token";

/// The client's view of who is signed in.
pub struct AuthSession {
    storage: Arc<dyn Storage>,
    user: Option<User>,
    token: Option<String>,
    initialized: bool,
}

impl AuthSession {
    /// Create an uninitialized session.
    ///
    /// Call [`Self::initialize`] before gating any view on it.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            user: None,
            token: None,
            initialized: false,
        }
    }

    /// Restore user and token from local storage.
    ///
    /// A corrupt persisted user is discarded (and cleared from storage)
    /// rather than propagated: the worst outcome is being signed out.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be read.
    pub fn initialize(&mut self) -> Result<(), ClientError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        match (token, user) {
            (Some(token), Some(user_json)) => match serde_json::from_str::<User>(&user_json) {
                Ok(user) => {
                    self.user = Some(user);
                    self.token = Some(token);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "discarding corrupt persisted session");
                    self.storage.remove(USER_KEY)?;
                    self.storage.remove(TOKEN_KEY)?;
                }
            },
            _ => {
                self.user = None;
                self.token = None;
            }
        }

        self.initialized = true;
        Ok(())
    }

    /// Whether [`Self::initialize`] has run.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register a new account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field detail for invalid input.
    pub async fn register(
        &mut self,
        api: &ApiClient,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&User, ClientError> {
        let response = api.register(name, email, password).await?;
        self.store_login(response.user, response.token)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 for bad credentials.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&User, ClientError> {
        let response = api.login(email, password).await?;
        self.store_login(response.user, response.token)
    }

    /// Sign out, clearing the persisted session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be written.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.user = None;
        self.token = None;
        self.storage.remove(USER_KEY)?;
        self.storage.remove(TOKEN_KEY)?;
        Ok(())
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the signed-in user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }

    fn store_login(&mut self, user: User, token: String) -> Result<&User, ClientError> {
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.storage.set(TOKEN_KEY, &token)?;
        self.token = Some(token);
        self.initialized = true;
        Ok(self.user.insert(user))
    }
}
