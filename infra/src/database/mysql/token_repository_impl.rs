//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh tokens are stored by SHA-256 hash only. Rotation runs in a single
//! transaction that locks the presented row with `SELECT ... FOR UPDATE`, so
//! two concurrent rotations of the same token serialize and the second one
//! sees it revoked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use crm_core::domain::entities::token::{
    PendingRefreshToken, RefreshToken, RevocationOutcome, RotationOutcome,
};
use crm_core::errors::DomainError;
use crm_core::repositories::TokenRepository;

use super::is_unique_violation;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, token_hash, issued_at, expires_at, revoked, replaced_by FROM refresh_tokens";

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::internal(format!("Failed to get id: {}", e)))?;

        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| DomainError::internal(format!("Failed to get user_id: {}", e)))?;

        let replaced_by: Option<String> = row
            .try_get("replaced_by")
            .map_err(|e| DomainError::internal(format!("Failed to get replaced_by: {}", e)))?;

        Ok(RefreshToken {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| DomainError::internal(format!("Failed to get token_hash: {}", e)))?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| DomainError::internal(format!("Failed to get issued_at: {}", e)))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::internal(format!("Failed to get expires_at: {}", e)))?,
            revoked: row
                .try_get("revoked")
                .map_err(|e| DomainError::internal(format!("Failed to get revoked: {}", e)))?,
            replaced_by: replaced_by.as_deref().map(parse_uuid).transpose()?,
        })
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::internal(format!("Invalid UUID: {}", e)))
}

fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| {
        tracing::error!("{}: {}", context, e);
        DomainError::internal(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, issued_at, expires_at, revoked, replaced_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(token.revoked)
            .bind(token.replaced_by.map(|id| id.to_string()))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::internal("Refresh token hash already exists")
                } else {
                    DomainError::internal(format!("Failed to save refresh token: {}", e))
                }
            })?;

        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find refresh token"))?;

        result.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find token by id"))?;

        result.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND revoked = FALSE AND expires_at >= ? ORDER BY issued_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to find user tokens"))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn rotate_refresh_token(
        &self,
        token_hash: &str,
        replacement: PendingRefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin rotation transaction"))?;

        let query = format!("{} WHERE token_hash = ? LIMIT 1 FOR UPDATE", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock refresh token"))?;

        let previous = match row {
            Some(row) => Self::row_to_token(&row)?,
            // Dropping the transaction rolls it back; nothing was written
            None => return Ok(RotationOutcome::NotFound),
        };
        if previous.revoked {
            return Ok(RotationOutcome::Revoked(previous));
        }
        if previous.is_expired_at(now) {
            return Ok(RotationOutcome::Expired(previous));
        }

        let replacement = replacement.into_token(previous.user_id);
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, issued_at, expires_at, revoked, replaced_by
            ) VALUES (?, ?, ?, ?, ?, FALSE, NULL)
            "#,
        )
        .bind(replacement.id.to_string())
        .bind(replacement.user_id.to_string())
        .bind(&replacement.token_hash)
        .bind(replacement.issued_at)
        .bind(replacement.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert replacement token"))?;

        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE, replaced_by = ? WHERE id = ?")
            .bind(replacement.id.to_string())
            .bind(previous.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to revoke rotated token"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit rotation"))?;

        let previous = RefreshToken {
            revoked: true,
            replaced_by: Some(replacement.id),
            ..previous
        };
        Ok(RotationOutcome::Rotated {
            previous,
            replacement,
        })
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<RevocationOutcome, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = ? AND revoked = FALSE",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke token"))?;

        if result.rows_affected() > 0 {
            return Ok(RevocationOutcome::Revoked);
        }

        // Nothing flipped: either unknown or already revoked
        match self.find_refresh_token(token_hash).await? {
            Some(_) => Ok(RevocationOutcome::AlreadyRevoked),
            None => Ok(RevocationOutcome::NotFound),
        }
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = ? AND revoked = FALSE",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke user tokens"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired_tokens(
        &self,
        before: DateTime<Utc>,
        batch_size: u32,
    ) -> Result<usize, DomainError> {
        let batch_size = batch_size.max(1);
        let mut total = 0usize;

        // Short statements so row locks are released between batches
        loop {
            let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ? LIMIT ?")
                .bind(before)
                .bind(batch_size)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to delete expired tokens"))?;

            let deleted = result.rows_affected() as usize;
            total += deleted;
            tracing::debug!(deleted, total, "Expired refresh token batch deleted");

            if deleted < batch_size as usize {
                break;
            }
        }

        Ok(total)
    }
}
