//! Authentication service and credential collaborator boundary.
//!
//! Passwords are hashed with argon2; sessions are stateless bearer tokens
//! (see [`token::TokenService`]). Role checks happen here, in the service,
//! so a misrouted request can never skip them.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::TokenService;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use voltline_core::{Email, Role, UserId};

use crate::error::FieldError;
use crate::models::User;
use crate::store::{Store, StoreError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// The authenticated caller, as attested by a verified bearer token.
///
/// Handlers obtain one from the auth extractors and pass it into services;
/// services call [`AuthContext::require_admin`] before administrative
/// operations rather than trusting the routing layer to have done so.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    /// The calling user.
    pub user_id: UserId,
    /// The caller's role at token issuance.
    pub role: Role,
}

impl AuthContext {
    /// Check that the caller holds the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` for non-admin callers.
    pub const fn require_admin(&self) -> Result<(), AuthError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login input.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user plus their freshly issued bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Authentication service.
///
/// Handles registration, login, admin registration, and role management.
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Register a new user account with the `user` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for malformed input and
    /// `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        self.create_account(req, Role::User).await
    }

    /// Register a new administrator account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` unless the caller is an admin, plus
    /// everything [`Self::register`] can return.
    pub async fn register_admin(
        &self,
        ctx: &AuthContext,
        req: RegisterRequest,
    ) -> Result<AuthResponse, AuthError> {
        ctx.require_admin()?;
        self.create_account(req, Role::Admin).await
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// the password does not match.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = Email::parse(&req.email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .store
            .user_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&req.password, &password_hash)?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse { user, token })
    }

    /// Set a user's role to the requested value.
    ///
    /// There is no transition restriction: an admin can demote themselves.
    /// Toggling twice restores the original role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` unless the caller is an admin,
    /// `AuthError::Validation` if `role` is not `user`/`admin`, and
    /// `AuthError::UserNotFound` if the target does not exist.
    pub async fn toggle_role(
        &self,
        ctx: &AuthContext,
        user_id: UserId,
        role: &str,
    ) -> Result<User, AuthError> {
        ctx.require_admin()?;

        let role: Role = role.parse().map_err(|_| {
            AuthError::Validation(vec![FieldError::new(
                "role",
                "role must be \"user\" or \"admin\"",
            )])
        })?;

        let user = self.store.set_role(user_id, role).await.map_err(|e| match e {
            StoreError::NotFound => AuthError::UserNotFound,
            other => AuthError::Store(other),
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "role updated");
        Ok(user)
    }

    async fn create_account(
        &self,
        req: RegisterRequest,
        role: Role,
    ) -> Result<AuthResponse, AuthError> {
        let mut errors = Vec::new();

        if req.name.trim().is_empty() {
            errors.push(FieldError::new("name", "name is required"));
        }
        let email = match Email::parse(&req.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(FieldError::new("email", e.to_string()));
                None
            }
        };
        if req.password.len() < MIN_PASSWORD_LENGTH {
            errors.push(FieldError::new(
                "password",
                format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }

        // email is always Some when no field errors were recorded
        let (Some(email), true) = (email, errors.is_empty()) else {
            return Err(AuthError::Validation(errors));
        };

        let password_hash = hash_password(&req.password)?;

        let user = self
            .store
            .insert_user(req.name.trim(), &email, &password_hash, role)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(AuthResponse { user, token })
    }
}

/// Hash a password with argon2.
///
/// Public for the CLI's admin-bootstrap command, which writes the first
/// admin account straight through the store.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use secrecy::SecretString;

    fn service() -> AuthService {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenService::new(
            &SecretString::from("kX9#mP2$vL5@qR8!wT3^zN6&yB4*uE7c"),
            24,
        ));
        AuthService::new(store, tokens)
    }

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_owned(),
            email: email.to_owned(),
            password: "hunter22".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let registered = auth.register(register_req("ada@example.com")).await.unwrap();
        assert_eq!(registered.user.role, Role::User);

        let logged_in = auth
            .login(LoginRequest {
                email: "ada@example.com".to_owned(),
                password: "hunter22".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = service();
        auth.register(register_req("ada@example.com")).await.unwrap();

        let err = auth
            .login(LoginRequest {
                email: "ada@example.com".to_owned(),
                password: "wrong-password".to_owned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = service();
        auth.register(register_req("ada@example.com")).await.unwrap();

        let err = auth
            .register(register_req("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_validation_collects_fields() {
        let auth = service();
        let err = auth
            .register(RegisterRequest {
                name: "  ".to_owned(),
                email: "not-an-email".to_owned(),
                password: "pw".to_owned(),
            })
            .await
            .unwrap_err();

        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);
    }

    #[tokio::test]
    async fn test_toggle_role_requires_admin() {
        let auth = service();
        let registered = auth.register(register_req("ada@example.com")).await.unwrap();

        let ctx = AuthContext {
            user_id: registered.user.id,
            role: Role::User,
        };
        let err = auth
            .toggle_role(&ctx, registered.user.id, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }

    #[tokio::test]
    async fn test_toggle_role_twice_restores_original() {
        let auth = service();
        let registered = auth.register(register_req("ada@example.com")).await.unwrap();
        let admin_ctx = AuthContext {
            user_id: UserId::new(99),
            role: Role::Admin,
        };

        let promoted = auth
            .toggle_role(&admin_ctx, registered.user.id, "admin")
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Admin);

        let demoted = auth
            .toggle_role(&admin_ctx, registered.user.id, "user")
            .await
            .unwrap();
        assert_eq!(demoted.role, registered.user.role);
    }

    #[tokio::test]
    async fn test_toggle_role_invalid_value() {
        let auth = service();
        let admin_ctx = AuthContext {
            user_id: UserId::new(99),
            role: Role::Admin,
        };
        let err = auth
            .toggle_role(&admin_ctx, UserId::new(1), "superuser")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_toggle_role_missing_user() {
        let auth = service();
        let admin_ctx = AuthContext {
            user_id: UserId::new(99),
            role: Role::Admin,
        };
        let err = auth
            .toggle_role(&admin_ctx, UserId::new(12345), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
