//! Verification contract consumed by the authentication gate

use crate::domain::entities::token::AccessClaims;
use crate::errors::TokenError;

/// Verifies access tokens without touching any store
///
/// Object safe so the HTTP layer can hold it as `Arc<dyn AccessTokenVerifier>`
/// regardless of which repositories back the token service.
pub trait AccessTokenVerifier: Send + Sync {
    fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError>;
}
