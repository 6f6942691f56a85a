//! User domain types.

use serde::{Deserialize, Serialize};

use voltline_core::{Email, Role, UserId};

/// A storefront user.
///
/// The password hash never leaves the store layer; this type is safe to
/// return from the REST surface as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: Email,
    /// Access level; mutable post-creation by an administrator.
    pub role: Role,
}
