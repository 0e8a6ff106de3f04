//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{
    PendingRefreshToken, RefreshToken, RevocationOutcome, RotationOutcome,
};
use crate::errors::DomainError;

/// Repository trait for RefreshToken persistence operations
///
/// Tokens are looked up by the SHA-256 hash of the opaque value handed to
/// the client; the raw value never reaches the store.
///
/// # Concurrency
/// `rotate_refresh_token` must run as one atomic unit. Two concurrent
/// rotations of the same token must leave exactly one `Rotated` outcome.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError)` - Save failed (e.g., duplicate hash)
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    ///
    /// Revoked and expired tokens are returned as well; callers decide what
    /// the state means.
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Find a refresh token by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError>;

    /// Find the active (non-revoked, non-expired) tokens of a user
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Utc;
    /// # use uuid::Uuid;
    /// # use crm_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    /// let sessions = repo.find_active_by_user_id(user_id, Utc::now()).await?;
    /// println!("User has {} active sessions", sessions.len());
    /// # Ok(())
    /// # }
    /// ```
    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError>;

    /// Atomically rotate the token identified by `token_hash`
    ///
    /// Within a single unit of work:
    /// 1. Find the token, locking it against concurrent rotation
    /// 2. Report `NotFound`, `Revoked` or `Expired` (checked in that order)
    ///    without modifying anything
    /// 3. Otherwise insert `replacement` for the same user, revoke the old
    ///    token and set its `replaced_by` to the replacement's ID
    async fn rotate_refresh_token(
        &self,
        token_hash: &str,
        replacement: PendingRefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError>;

    /// Revoke a specific refresh token
    ///
    /// Never un-revokes; revoking twice reports `AlreadyRevoked`.
    async fn revoke_token(&self, token_hash: &str) -> Result<RevocationOutcome, DomainError>;

    /// Revoke all active refresh tokens for a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens newly revoked
    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Delete refresh tokens that expired before `before`
    ///
    /// Maintenance operation. Implementations delete in chunks of at most
    /// `batch_size` rows so that live traffic is not blocked.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens deleted
    async fn delete_expired_tokens(
        &self,
        before: DateTime<Utc>,
        batch_size: u32,
    ) -> Result<usize, DomainError>;

    /// Count active sessions for a user
    async fn count_active_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let tokens = self.find_active_by_user_id(user_id, now).await?;
        Ok(tokens.len())
    }
}
