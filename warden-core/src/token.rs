//! Issued credentials and their lifecycle policy
//!
//! A [`Token`] is one issued credential: an opaque value bound to a user,
//! with a purpose-specific lifetime. Tokens move through three states —
//! Active, Expired, Revoked. Expiry is purely a function of the clock
//! crossing `expires_at`; revocation is a one-way mark applied with
//! [`Token::revoke`]. Nothing restores validity.
//!
//! Like the rest of the domain layer, tokens are immutable snapshots: the two
//! mutators ([`Token::revoke`], [`Token::update_metadata`]) return a new
//! instance with a refreshed `updated_at`, and every time-dependent check
//! takes `now` explicitly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Metadata,
    error::TokenError,
    id::{generate_prefixed_id, generate_secret, validate_prefixed_id},
    user::UserId,
};

/// The purpose of an issued credential. Closed set; each purpose carries its
/// own default lifetime in [`TokenTtlConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    ResetPassword,
    EmailVerification,
}

impl TokenType {
    pub const ALL: [TokenType; 4] = [
        TokenType::Access,
        TokenType::Refresh,
        TokenType::ResetPassword,
        TokenType::EmailVerification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::ResetPassword => "reset_password",
            TokenType::EmailVerification => "email_verification",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenType::Access),
            "refresh" => Ok(TokenType::Refresh),
            "reset_password" => Ok(TokenType::ResetPassword),
            "email_verification" => Ok(TokenType::EmailVerification),
            other => Err(TokenError::UnknownType(other.to_string())),
        }
    }
}

/// Default lifetimes per token purpose, plus the cleanup windows.
///
/// Injected at construction wherever expirations are computed. The defaults
/// are the behavioral contract; deployments may tune them.
#[derive(Debug, Clone)]
pub struct TokenTtlConfig {
    pub access: Duration,
    pub refresh: Duration,
    pub reset_password: Duration,
    pub email_verification: Duration,
    /// Grace period after expiry before an expired token becomes a cleanup
    /// candidate.
    pub cleanup_grace_hours: i64,
    /// How long revoked tokens are retained before deletion.
    pub revoked_retention_hours: i64,
}

impl Default for TokenTtlConfig {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            reset_password: Duration::hours(1),
            email_verification: Duration::hours(24),
            cleanup_grace_hours: 24,
            revoked_retention_hours: 24,
        }
    }
}

impl TokenTtlConfig {
    /// The configured lifetime for a token purpose.
    pub fn expiration_for(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access,
            TokenType::Refresh => self.refresh,
            TokenType::ResetPassword => self.reset_password,
            TokenType::EmailVerification => self.email_verification,
        }
    }

    /// The expiry timestamp for a token of the given purpose issued at `now`.
    pub fn calculate_expiration(&self, token_type: TokenType, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.expiration_for(token_type)
    }
}

/// A unique, stable identifier for an issued token.
/// Opaque; distinct from the token's secret `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: &str) -> Self {
        TokenId(id.to_string())
    }

    pub fn new_random() -> Self {
        TokenId(generate_prefixed_id("tok"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "tok")
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for TokenId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TokenId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generate an opaque token value with 256 bits of entropy.
pub fn generate_token_value() -> String {
    generate_secret()
}

/// One issued credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,

    pub user_id: UserId,

    pub token_type: TokenType,

    /// The opaque credential string presented by clients.
    pub value: String,

    /// Set at creation and never changed afterwards.
    pub expires_at: DateTime<Utc>,

    /// One-way mark; never cleared once set.
    pub revoked: bool,

    pub metadata: Metadata,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Token {
    /// Whether the clock has crossed `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Whether the token is usable: neither revoked nor expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }

    /// Mark the token revoked.
    ///
    /// Idempotent in effect: revoking an already-revoked token changes
    /// nothing but `updated_at`.
    pub fn revoke(&self, now: DateTime<Utc>) -> Self {
        Self {
            revoked: true,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Shallow-merge `patch` into the metadata; patch keys win on conflict.
    pub fn update_metadata(&self, patch: Metadata, now: DateTime<Utc>) -> Self {
        let mut metadata = self.metadata.clone();
        for (key, value) in patch {
            metadata.insert(key, value);
        }

        Self {
            metadata,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Whole minutes until expiry, clamped at zero.
    pub fn time_until_expiration_minutes(&self, now: DateTime<Utc>) -> i64 {
        let remaining_ms = (self.expires_at - now).num_milliseconds();
        (remaining_ms / 60_000).max(0)
    }

    pub fn belongs_to_user(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn is_of_type(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }

    /// Whether the token is stale enough to delete from storage.
    ///
    /// Never true for unexpired tokens, revoked or not; revoked-token
    /// retention is a separate repository concern.
    pub fn should_cleanup(&self, now: DateTime<Utc>, cleanup_grace_hours: i64) -> bool {
        if !self.is_expired(now) {
            return false;
        }

        now > self.expires_at + Duration::hours(cleanup_grace_hours)
    }
}

/// Data for issuing a new token. The repository assigns the [`TokenId`] and
/// the persistence timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewToken {
    pub user_id: UserId,
    pub token_type: TokenType,
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub metadata: Metadata,
}

impl NewToken {
    /// New token data with the purpose-default expiration from `ttl`.
    pub fn new(
        user_id: UserId,
        token_type: TokenType,
        value: String,
        ttl: &TokenTtlConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            token_type,
            value,
            expires_at: ttl.calculate_expiration(token_type, now),
            metadata: Metadata::new(),
        }
    }

    /// Override the expiration set by [`NewToken::new`].
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Materialize the stored token. Repositories call this on create.
    pub fn into_token(self, id: TokenId, now: DateTime<Utc>) -> Token {
        Token {
            id,
            user_id: self.user_id,
            token_type: self.token_type,
            value: self.value,
            expires_at: self.expires_at,
            revoked: false,
            metadata: self.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}
