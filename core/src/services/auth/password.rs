//! Password hashing with bcrypt
//!
//! bcrypt is deliberately slow, so both operations run on tokio's blocking
//! pool instead of stalling the async workers.

use tracing::error;

use crate::errors::DomainError;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Salted, slow password hashing
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (4..=31)
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    /// bcrypt cost in use
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password; every call produces a different salt
    pub async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                DomainError::internal("Password hashing failed")
            })
    }

    /// Verify a password against a stored hash
    ///
    /// A hash that cannot be parsed counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
