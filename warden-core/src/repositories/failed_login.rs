//! Repository trait for failed login tracking.
//!
//! This module defines the storage interface for the account lockout policy:
//! per (user, source IP) attempt records, atomic increments, and cleanup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    failed_login::{FailedLoginRecord, NewFailedLogin},
};

/// Repository for failed login records.
///
/// Implementations persist one record per (user, source IP) pair and apply
/// the lockout policy over snapshots of it. Records should be kept for all
/// submitted identifiers, even non-existent ones, to prevent user
/// enumeration attacks.
///
/// # Concurrency
///
/// Concurrent failures for the same pair must not undercount:
/// [`FailedLoginRepository::increment_attempts`] must be serialized or use an
/// atomic increment / compare-and-swap at the storage layer. Recording at
/// least as many attempts as actual failures is the contract; overcounting
/// under retry is acceptable, losing increments is not.
#[async_trait]
pub trait FailedLoginRepository: Send + Sync + 'static {
    /// Persist the first failed attempt for a pair.
    async fn create(&self, data: NewFailedLogin) -> Result<FailedLoginRecord, Error>;

    /// Fetch the record for a pair, if one exists.
    async fn find_by_user_and_ip(
        &self,
        user_id: &str,
        ip_address: &str,
    ) -> Result<Option<FailedLoginRecord>, Error>;

    /// Atomically record one more failure for a pair, creating the record if
    /// none exists. Returns the updated snapshot.
    async fn increment_attempts(
        &self,
        user_id: &str,
        ip_address: &str,
    ) -> Result<FailedLoginRecord, Error>;

    /// Clear the attempt counter after a successful authentication.
    async fn reset_attempts(&self, user_id: &str, ip_address: &str) -> Result<(), Error>;

    /// Whether an active lockout currently blocks the pair.
    async fn is_account_locked(&self, user_id: &str, ip_address: &str) -> Result<bool, Error>;

    /// Minutes until the pair's active lockout ends; zero when not locked.
    async fn remaining_lockout_minutes(
        &self,
        user_id: &str,
        ip_address: &str,
    ) -> Result<i64, Error>;

    /// Delete records whose lockout window has passed and whose attempt
    /// counter is stale. Returns the number of records deleted.
    async fn delete_expired(&self) -> Result<u64, Error>;

    /// Delete records whose last attempt is older than the cutoff. Returns
    /// the number of records deleted.
    async fn cleanup_old_records(&self, older_than: DateTime<Utc>) -> Result<u64, Error>;
}
