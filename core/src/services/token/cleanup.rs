//! Token cleanup service for periodic maintenance of refresh tokens
//!
//! Expired refresh tokens are useless for authentication but keep growing
//! the table. This runs outside request scope and deletes them in bounded
//! batches so live login/refresh traffic is never blocked for long.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use crm_shared::config::CleanupConfig;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Grace period after expiry before deletion (in days)
    pub grace_period_days: i64,
    /// Maximum number of tokens to delete in one statement
    pub batch_size: u32,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            grace_period_days: 0,
            batch_size: 1000,
            enabled: true,
        }
    }
}

impl From<&CleanupConfig> for TokenCleanupConfig {
    fn from(config: &CleanupConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds.max(1),
            grace_period_days: config.grace_period_days.max(0),
            batch_size: config.batch_size.max(1),
            enabled: config.enabled,
        }
    }
}

/// Service for cleaning up expired refresh tokens
pub struct TokenCleanupService<R: TokenRepository + 'static> {
    repository: Arc<R>,
    config: TokenCleanupConfig,
}

impl<R: TokenRepository> TokenCleanupService<R> {
    pub fn new(repository: Arc<R>, config: TokenCleanupConfig) -> Self {
        Self { repository, config }
    }

    /// One cleanup pass against the current clock
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        self.run_cleanup_at(Utc::now()).await
    }

    /// One cleanup pass: deletes refresh tokens that expired more than the
    /// grace period before `now`
    ///
    /// Store failures are recorded in the result rather than returned, so a
    /// flaky database never stops the background loop.
    pub async fn run_cleanup_at(&self, now: DateTime<Utc>) -> Result<CleanupResult, DomainError> {
        let cutoff = now - Duration::days(self.config.grace_period_days);
        let mut result = CleanupResult {
            cutoff,
            ..Default::default()
        };
        if !self.config.enabled {
            return Ok(result);
        }

        match self
            .repository
            .delete_expired_tokens(cutoff, self.config.batch_size)
            .await
        {
            Ok(0) => debug!(%cutoff, "No expired refresh tokens"),
            Ok(deleted) => {
                result.expired_tokens_deleted = deleted;
                info!(%cutoff, deleted, "Expired refresh tokens deleted");
            }
            Err(e) => {
                error!(%cutoff, error = %e, "Refresh token cleanup failed");
                result.errors.push(e.to_string());
            }
        }

        Ok(result)
    }

    /// Spawns the periodic cleanup loop; `None` when cleanup is disabled
    ///
    /// The first pass runs immediately. Missed ticks are delayed, never
    /// bunched, so a slow pass cannot trigger back-to-back deletes.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Refresh token cleanup disabled");
            return None;
        }

        let period = std::time::Duration::from_secs(self.config.interval_seconds);
        info!(interval_seconds = self.config.interval_seconds, "Refresh token cleanup scheduled");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Refresh token cleanup pass aborted");
                }
            }
        }))
    }
}

/// Outcome of one cleanup pass
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Tokens that expired before this instant were eligible
    pub cutoff: DateTime<Utc>,
    pub expired_tokens_deleted: usize,
    /// Store errors hit during the pass
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
