//! Domain-specific error types for authentication and token management
//!
//! Error messages here are safe to show to clients. Sub-checks that must not
//! leak (unknown email vs wrong password) share a single variant.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email is already registered")]
    DuplicateEmail,

    /// Composite failure for refresh and identity lookups; the client must
    /// log in again
    #[error("Authentication required")]
    Unauthenticated,
}

/// Token-related errors
///
/// `ExpiredToken`, `InvalidSignature` and `MalformedToken` concern access
/// tokens; `TokenExpired`, `TokenRevoked` and `TokenNotFound` concern
/// refresh tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Access token is required")]
    MissingToken,

    #[error("Access token is malformed")]
    MalformedToken,

    #[error("Access token signature is invalid")]
    InvalidSignature,

    #[error("Access token has expired")]
    ExpiredToken,

    #[error("Refresh token has expired")]
    TokenExpired,

    #[error("Refresh token has been revoked")]
    TokenRevoked,

    #[error("Refresh token not found")]
    TokenNotFound,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

impl TokenError {
    /// Whether the error concerns a refresh token rather than an access token
    pub fn is_refresh_error(&self) -> bool {
        matches!(
            self,
            TokenError::TokenExpired | TokenError::TokenRevoked | TokenError::TokenNotFound
        )
    }
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}
