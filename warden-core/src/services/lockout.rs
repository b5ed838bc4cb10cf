//! Account lockout service.
//!
//! Coordinates the lockout policy in [`crate::failed_login`] with its
//! repository: gate logins before the provider is consulted, record failures
//! after it rejects, reset after it accepts, and clean up stale records in
//! the background.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_core::services::LockoutService;
//! use warden_core::failed_login::LockoutConfig;
//!
//! let service = LockoutService::new(repository, LockoutConfig::default());
//!
//! // Gate the login attempt before checking credentials
//! let status = service.check("user@example.com", "192.168.1.1").await?;
//! if status.is_locked {
//!     // Reject with "retry in N minutes"
//! }
//!
//! // Record the outcome after the provider answers
//! let status = service.record_failure("user@example.com", "192.168.1.1", None).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    failed_login::{FailedLoginRecord, LockoutConfig, NewFailedLogin},
    repositories::FailedLoginRepository,
};

/// The lockout state of one (user, source IP) pair.
#[derive(Debug, Clone)]
pub struct LockoutStatus {
    pub user_id: String,
    pub attempts: u32,
    pub attempts_remaining: u32,
    pub is_locked: bool,
    /// When the active lockout ends; `None` when not locked.
    pub locked_until: Option<DateTime<Utc>>,
    /// Minutes until the active lockout ends; zero when not locked.
    pub retry_after_minutes: i64,
}

/// Service for account lockout tracking.
///
/// Thread-safe; the underlying repository owns concurrent-increment
/// correctness (see [`FailedLoginRepository`]).
pub struct LockoutService<R: FailedLoginRepository> {
    repository: Arc<R>,
    config: LockoutConfig,
}

impl<R: FailedLoginRepository> LockoutService<R> {
    pub fn new(repository: Arc<R>, config: LockoutConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Get the current lockout status for a (user, source IP) pair.
    ///
    /// Pairs without a record report zero attempts and no lockout.
    pub async fn check(&self, user_id: &str, ip_address: &str) -> Result<LockoutStatus, Error> {
        let record = self
            .repository
            .find_by_user_and_ip(user_id, ip_address)
            .await?;

        Ok(self.status_from(user_id, record.as_ref(), Utc::now()))
    }

    /// Whether an active lockout currently blocks the pair.
    pub async fn is_locked(&self, user_id: &str, ip_address: &str) -> Result<bool, Error> {
        Ok(self.check(user_id, ip_address).await?.is_locked)
    }

    /// Record a failed login attempt and return the updated status.
    ///
    /// Creates the record on the first failure for a pair, increments it
    /// afterwards. The repository owns atomicity for concurrent failures.
    pub async fn record_failure(
        &self,
        user_id: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> Result<LockoutStatus, Error> {
        let existing = self
            .repository
            .find_by_user_and_ip(user_id, ip_address)
            .await?;

        let record = match existing {
            Some(_) => {
                self.repository
                    .increment_attempts(user_id, ip_address)
                    .await?
            }
            None => {
                let mut data = NewFailedLogin::new(user_id, ip_address);
                if let Some(user_agent) = user_agent {
                    data = data.with_user_agent(user_agent);
                }
                self.repository.create(data).await?
            }
        };

        let status = self.status_from(user_id, Some(&record), Utc::now());

        if status.is_locked {
            tracing::warn!(
                user_id = %user_id,
                ip_address = %ip_address,
                attempts = status.attempts,
                retry_after_minutes = status.retry_after_minutes,
                "Account locked after repeated failed login attempts"
            );
        }

        Ok(status)
    }

    /// Clear the attempt counter after a successful authentication.
    pub async fn record_success(&self, user_id: &str, ip_address: &str) -> Result<(), Error> {
        self.repository.reset_attempts(user_id, ip_address).await
    }

    /// Start the background cleanup task.
    ///
    /// Spawns a task that periodically deletes records whose last attempt is
    /// older than the configured retention window.
    pub fn start_cleanup_task(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let retention = self.config.cleanup_after;

        // Cleanup runs hourly
        const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(CLEANUP_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let older_than = Utc::now() - retention;
                        match repository.cleanup_old_records(older_than).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Cleaned up stale failed login records");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to clean up failed login records");
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down lockout cleanup task");
                        break;
                    }
                }
            }
        })
    }

    fn status_from(
        &self,
        user_id: &str,
        record: Option<&FailedLoginRecord>,
        now: DateTime<Utc>,
    ) -> LockoutStatus {
        let Some(record) = record else {
            return LockoutStatus {
                user_id: user_id.to_string(),
                attempts: 0,
                attempts_remaining: self.config.max_attempts,
                is_locked: false,
                locked_until: None,
                retry_after_minutes: 0,
            };
        };

        let is_locked = record.is_currently_locked(&self.config, now);

        LockoutStatus {
            user_id: user_id.to_string(),
            attempts: record.attempts,
            attempts_remaining: record.attempts_remaining(&self.config),
            is_locked,
            locked_until: is_locked
                .then(|| record.last_attempt_at + self.config.lockout_duration),
            retry_after_minutes: record.remaining_lockout_minutes(&self.config, now),
        }
    }
}
