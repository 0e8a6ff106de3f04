//! Authentication results handed from the services to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::user::User;

/// A freshly minted token together with its expiry
///
/// Used for both access tokens (signed JWT) and refresh tokens (opaque
/// random value, only its hash is stored).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Seconds remaining until expiry, clamped at zero
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Signed access token for `Authorization: Bearer`
    pub access_token: IssuedToken,

    /// Opaque refresh token for the refresh carrier
    pub refresh_token: IssuedToken,

    /// Profile of the authenticated user
    pub user: User,
}

/// Result of a successful refresh-token rotation
#[derive(Debug, Clone)]
pub struct RotatedSession {
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
}
