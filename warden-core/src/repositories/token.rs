//! Repository trait for issued tokens.

use async_trait::async_trait;

use crate::{
    Error, UserId,
    token::{NewToken, Token, TokenId, TokenType},
};

/// Repository for issued credentials.
///
/// Lookups by value must treat the stored value as an opaque string. The
/// validity filter applied by [`TokenRepository::find_valid_by_user`] and
/// [`TokenRepository::validate`] is [`Token::is_valid`]: not revoked and not
/// expired at the time of the call.
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Persist a newly issued token under the given id.
    async fn create(&self, data: NewToken, id: TokenId) -> Result<Token, Error>;

    /// Fetch a token by its opaque value, valid or not.
    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, Error>;

    /// Fetch a user's currently valid tokens, optionally restricted to one
    /// purpose.
    async fn find_valid_by_user(
        &self,
        user_id: &UserId,
        token_type: Option<TokenType>,
    ) -> Result<Vec<Token>, Error>;

    /// Mark one token revoked. Returns the updated snapshot. Idempotent:
    /// revoking an already-revoked token succeeds without further effect.
    async fn revoke(&self, id: &TokenId) -> Result<Token, Error>;

    /// Revoke all of a user's tokens, optionally restricted to one purpose.
    /// Each row's revoke is independent and idempotent, so partial completion
    /// under failure is safe to retry. Returns the number of tokens revoked.
    async fn revoke_all_for_user(
        &self,
        user_id: &UserId,
        token_type: Option<TokenType>,
    ) -> Result<u64, Error>;

    /// Resolve an opaque value to its token if, and only if, the token
    /// exists, is valid, and matches the expected purpose when one is given.
    /// Returns `None` in every failure case without distinguishing them.
    async fn validate(&self, value: &str, token_type: Option<TokenType>)
    -> Result<Option<Token>, Error>;

    /// Delete expired tokens past their cleanup grace period. Returns the
    /// number of tokens deleted.
    async fn delete_expired(&self) -> Result<u64, Error>;

    /// Delete revoked tokens older than the retention window. Returns the
    /// number of tokens deleted.
    async fn delete_revoked_older_than(&self, hours: i64) -> Result<u64, Error>;
}
