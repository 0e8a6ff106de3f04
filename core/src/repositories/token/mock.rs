//! In-memory implementation of TokenRepository for tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{
    PendingRefreshToken, RefreshToken, RevocationOutcome, RotationOutcome,
};
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Mock token repository keyed by token hash
///
/// Rotation holds the write lock for its whole check-revoke-insert sequence,
/// which gives the same single-winner guarantee as a row lock.
#[derive(Clone)]
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored tokens, revoked ones included
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether the repository holds no tokens
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::internal("Token already exists"));
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.id == id).cloned())
    }

    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_usable_at(now))
            .cloned()
            .collect())
    }

    async fn rotate_refresh_token(
        &self,
        token_hash: &str,
        replacement: PendingRefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError> {
        let mut tokens = self.tokens.write().await;

        let current = match tokens.get(token_hash) {
            Some(token) => token.clone(),
            None => return Ok(RotationOutcome::NotFound),
        };
        if current.revoked {
            return Ok(RotationOutcome::Revoked(current));
        }
        if current.is_expired_at(now) {
            return Ok(RotationOutcome::Expired(current));
        }
        if tokens.contains_key(&replacement.token_hash) {
            return Err(DomainError::internal("Token already exists"));
        }

        let replacement = replacement.into_token(current.user_id);
        let mut previous = current;
        previous.revoked = true;
        previous.replaced_by = Some(replacement.id);

        tokens.insert(previous.token_hash.clone(), previous.clone());
        tokens.insert(replacement.token_hash.clone(), replacement.clone());

        Ok(RotationOutcome::Rotated {
            previous,
            replacement,
        })
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<RevocationOutcome, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token_hash) {
            Some(token) if token.revoked => Ok(RevocationOutcome::AlreadyRevoked),
            Some(token) => {
                token.revoke();
                Ok(RevocationOutcome::Revoked)
            }
            None => Ok(RevocationOutcome::NotFound),
        }
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.revoked {
                token.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired_tokens(
        &self,
        before: DateTime<Utc>,
        _batch_size: u32,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| token.expires_at >= before);

        Ok(initial_count - tokens.len())
    }
}
