//! Failed login tracking and account lockout policy
//!
//! This module contains the [`FailedLoginRecord`] entity and the pure lockout
//! policy computed over it. One record accumulates the failed authentication
//! attempts for a single (user, source IP) pair:
//!
//! | Field             | Type               | Description                                     |
//! | ----------------- | ------------------ | ----------------------------------------------- |
//! | `id`              | `String`           | The unique identifier for the record.           |
//! | `user_id`         | `String`           | The attempted user identifier or email.         |
//! | `ip_address`      | `String`           | The source address of the attempts.             |
//! | `user_agent`      | `Option<String>`   | The user agent of the client, when known.       |
//! | `attempts`        | `u32`              | Cumulative failed attempts since last reset.    |
//! | `last_attempt_at` | `DateTime`         | The timestamp of the most recent failure.       |
//! | `locked_until`    | `Option<DateTime>` | Stored for persistence compatibility; unused.   |
//! | `metadata`        | `Metadata`         | Open key-value map.                             |
//! | `created_at`      | `DateTime`         | The timestamp when the record was created.      |
//! | `updated_at`      | `DateTime`         | The timestamp when the record was last updated. |
//!
//! Every operation is a pure function of a record snapshot plus an explicit
//! `now`; mutators return a new snapshot and leave persistence to the caller.
//! Lockout is derived entirely from `attempts`, `last_attempt_at`, and the
//! injected [`LockoutConfig`] window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Metadata, id::generate_prefixed_id};

/// Tunables for the lockout policy.
///
/// Injected into every policy decision so callers (and tests) can run with
/// arbitrary windows instead of compiled-in constants.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Failed attempts at or above this count lock the account.
    pub max_attempts: u32,
    /// How long a lockout blocks further attempts, measured from the last
    /// failed attempt.
    pub lockout_duration: Duration,
    /// Records whose last attempt is older than this are cleanup candidates.
    pub cleanup_after: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_duration: Duration::minutes(30),
            cleanup_after: Duration::days(30),
        }
    }
}

/// Cumulative failed authentication attempts for one (user, source IP) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedLoginRecord {
    pub id: String,

    /// The attempted user identifier. Callers that track pre-authentication
    /// failures use the submitted email here, so the record exists whether or
    /// not the user does.
    pub user_id: String,

    pub ip_address: String,

    pub user_agent: Option<String>,

    pub attempts: u32,

    pub last_attempt_at: DateTime<Utc>,

    /// Carried for storage layers that persist a lockout column. The policy
    /// only ever clears it; lockout state is derived from `attempts` and
    /// `last_attempt_at`.
    pub locked_until: Option<DateTime<Utc>>,

    pub metadata: Metadata,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Data for recording the first failed attempt of a (user, source IP) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFailedLogin {
    pub user_id: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    /// When the failure happened, if the caller observed it earlier than now.
    pub attempted_at: Option<DateTime<Utc>>,
    pub metadata: Metadata,
}

impl NewFailedLogin {
    pub fn new(user_id: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ip_address: ip_address.into(),
            user_agent: None,
            attempted_at: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_attempted_at(mut self, attempted_at: DateTime<Utc>) -> Self {
        self.attempted_at = Some(attempted_at);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Materialize the record for the first failure: one attempt, no lockout,
    /// fresh timestamps. Repositories call this when no record exists yet for
    /// the (user, source IP) pair.
    pub fn into_record(self, now: DateTime<Utc>) -> FailedLoginRecord {
        FailedLoginRecord {
            id: generate_prefixed_id("fla"),
            user_id: self.user_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            attempts: 1,
            last_attempt_at: self.attempted_at.unwrap_or(now),
            locked_until: None,
            metadata: self.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

impl FailedLoginRecord {
    /// Record one more failed attempt.
    ///
    /// Returns a new snapshot with the counter bumped and `last_attempt_at`
    /// moved to `now`. There is no upper clamp: `attempts` keeps counting past
    /// the lockout threshold.
    pub fn increment_attempts(&self, now: DateTime<Utc>) -> Self {
        Self {
            attempts: self.attempts + 1,
            last_attempt_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Whether the failure count has reached the lockout threshold.
    pub fn should_lock_account(&self, config: &LockoutConfig) -> bool {
        self.attempts >= config.max_attempts
    }

    /// Whether no active lockout blocks login.
    ///
    /// Returns `true` for records below the lockout threshold: "no lockout"
    /// is treated as vacuously expired. Callers must not read a `true` here
    /// as "a lockout occurred and ended"; for that question use
    /// [`FailedLoginRecord::is_currently_locked`].
    pub fn is_lockout_expired(&self, config: &LockoutConfig, now: DateTime<Utc>) -> bool {
        if !self.should_lock_account(config) {
            return true;
        }

        now > self.last_attempt_at + config.lockout_duration
    }

    /// Whether an active lockout blocks login right now.
    pub fn is_currently_locked(&self, config: &LockoutConfig, now: DateTime<Utc>) -> bool {
        self.should_lock_account(config) && !self.is_lockout_expired(config, now)
    }

    /// Minutes until the active lockout ends, rounded up.
    ///
    /// Zero when the record is not locked or the lockout has expired, and
    /// never above the configured lockout window.
    pub fn remaining_lockout_minutes(&self, config: &LockoutConfig, now: DateTime<Utc>) -> i64 {
        if !self.should_lock_account(config) || self.is_lockout_expired(config, now) {
            return 0;
        }

        let lockout_expiry = self.last_attempt_at + config.lockout_duration;
        let remaining_ms = (lockout_expiry - now).num_milliseconds();
        let minutes = (remaining_ms + 59_999) / 60_000;

        minutes.clamp(0, config.lockout_duration.num_minutes())
    }

    /// Attempts left before the account locks, clamped at zero.
    pub fn attempts_remaining(&self, config: &LockoutConfig) -> u32 {
        config.max_attempts.saturating_sub(self.attempts)
    }

    /// Whether the record is stale enough to delete from storage.
    pub fn should_cleanup(&self, config: &LockoutConfig, now: DateTime<Utc>) -> bool {
        now > self.last_attempt_at + config.cleanup_after
    }

    /// Clear the failure count after a successful authentication.
    ///
    /// `last_attempt_at` and the identity fields are preserved; only the
    /// counter and the stored lockout marker are cleared.
    pub fn reset(&self, now: DateTime<Utc>) -> Self {
        Self {
            attempts: 0,
            locked_until: None,
            updated_at: now,
            ..self.clone()
        }
    }
}
