//! Session-stored types.
//!
//! The whole authenticated identity lives in ONE typed object under one
//! session key. This is the single read/write boundary for everything the
//! original client scattered across browser-local storage (token, refresh
//! token, username, role, userId, image, email, status).

use chrono::{DateTime, Utc};
use lumora_core::{Role, UserId, UserStatus};
use serde::{Deserialize, Serialize};

/// The authenticated user, as stored in the session.
///
/// Created at login from the backend's login response plus the decoded
/// access-token claims; dropped at logout or when expiry is detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend-assigned user id.
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    /// Profile image URL.
    pub image: String,
    /// Backend-issued access token, attached to authenticated API calls.
    pub access_token: String,
    /// Refresh token (held for the backend; this layer never mints tokens).
    pub refresh_token: String,
    /// Access-token expiry, from the token's `exp` claim.
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Whether this user may see the admin console.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the access token has expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session keys.
pub mod keys {
    /// Key for the logged-in user object.
    pub const CURRENT_USER: &str = "current_user";
}
