//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Role, User};

/// Claims structure for the access token payload
///
/// Carries a copy of the user's identity at issuance time. The copy is not
/// refreshed until a new access token is minted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Email at issuance time
    pub email: String,

    /// Role at issuance time
    pub role: Role,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl AccessClaims {
    /// Creates claims for `user` valid from `now` for `lifetime`
    pub fn for_user(
        user: &User,
        now: DateTime<Utc>,
        lifetime: Duration,
        issuer: &str,
        audience: &str,
    ) -> Self {
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            nbf: now.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks whether the claims have expired at `now`
    ///
    /// A token is no longer valid from its `exp` second onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Expiry as a UTC timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// Refresh token entity stored in the database
///
/// Only the SHA-256 hash of the opaque token is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the refresh token
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// Hashed token value
    pub token_hash: String,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked; never flips back
    pub revoked: bool,

    /// Token that replaced this one on rotation
    pub replaced_by: Option<Uuid>,
}

impl RefreshToken {
    /// Creates a new refresh token issued at `now`
    pub fn new(user_id: Uuid, token_hash: String, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            issued_at: now,
            expires_at: now + lifetime,
            revoked: false,
            replaced_by: None,
        }
    }

    /// Checks if the refresh token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Checks if the refresh token has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// A token is usable if it is neither expired nor revoked
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    /// Revokes the refresh token
    pub fn revoke(&mut self) {
        self.revoked = true;
    }
}

/// Replacement token prepared before rotation
///
/// The owning user is only known once the presented token has been found,
/// so the store fills it in inside the rotation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRefreshToken {
    pub id: Uuid,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingRefreshToken {
    pub fn new(token_hash: String, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            issued_at: now,
            expires_at: now + lifetime,
        }
    }

    /// Binds the pending token to its owner
    pub fn into_token(self, user_id: Uuid) -> RefreshToken {
        RefreshToken {
            id: self.id,
            user_id,
            token_hash: self.token_hash,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            revoked: false,
            replaced_by: None,
        }
    }
}

/// Result of an atomic rotation attempt in the token store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The presented token was revoked and linked to `replacement`
    Rotated {
        previous: RefreshToken,
        replacement: RefreshToken,
    },
    /// No token with the presented hash exists
    NotFound,
    /// The presented token was already revoked
    Revoked(RefreshToken),
    /// The presented token is past its expiry
    Expired(RefreshToken),
}

/// Result of revoking a refresh token
///
/// Callers treat every variant as success; the distinction is kept for
/// auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationOutcome {
    /// The token was active and is now revoked
    Revoked,
    /// The token had already been revoked
    AlreadyRevoked,
    /// No token with the presented hash exists
    NotFound,
}
