//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Access token issuance and verification (stateless, HS256)
//! - Refresh token issuance, single-use rotation and revocation (stateful)
//! - Background cleanup of expired refresh tokens

mod cleanup;
mod config;
mod service;
mod verifier;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use service::{generate_refresh_token_value, hash_refresh_token, TokenService};
pub use verifier::AccessTokenVerifier;
