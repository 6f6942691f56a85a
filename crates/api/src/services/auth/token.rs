//! Bearer token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying the user id and role; every request
//! that presents one gets an [`AuthContext`](super::AuthContext) out of
//! [`TokenService::verify`].

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use voltline_core::{Role, UserId};

use super::{AuthContext, AuthError};
use crate::models::User;

/// JWT claims: subject (user id), role, and expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// Role at issuance time; a role change invalidates nothing until the
    /// token expires.
    pub role: Role,
    /// Expiry as a unix timestamp.
    pub exp: usize,
}

/// Issues and validates bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl TokenService {
    /// Create a token service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_hours,
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if encoding fails (malformed key).
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let exp = Utc::now() + chrono::Duration::hours(self.ttl_hours);
        let claims = Claims {
            sub: user.id.as_i32(),
            role: user.role,
            exp: usize::try_from(exp.timestamp()).unwrap_or(usize::MAX),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Validate a token and extract the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for expired tokens and
    /// `AuthError::InvalidToken` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(AuthContext {
            user_id: UserId::new(data.claims.sub),
            role: data.claims.role,
        })
    }
}
