//! Token issuance and validation service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error, Metadata, UserId,
    error::AuthError,
    repositories::TokenRepository,
    token::{NewToken, Token, TokenId, TokenTtlConfig, TokenType, generate_token_value},
};

/// Service for issuing and validating opaque tokens.
///
/// Values are generated with 256 bits of entropy and stored verbatim;
/// validation resolves a presented value back to its token through the
/// repository. Invalid, expired, revoked, and unknown values all surface as
/// [`AuthError::InvalidCredentials`] so callers cannot distinguish them.
pub struct TokenService<R: TokenRepository> {
    repository: Arc<R>,
    config: TokenTtlConfig,
}

impl<R: TokenRepository> TokenService<R> {
    pub fn new(repository: Arc<R>, config: TokenTtlConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &TokenTtlConfig {
        &self.config
    }

    /// Issue a token with the purpose-default lifetime.
    pub async fn issue(&self, user_id: &UserId, token_type: TokenType) -> Result<Token, Error> {
        self.issue_inner(user_id, token_type, None, Metadata::new())
            .await
    }

    /// Issue a token with an explicit expiry instead of the default.
    pub async fn issue_with_expiry(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Result<Token, Error> {
        self.issue_inner(user_id, token_type, Some(expires_at), Metadata::new())
            .await
    }

    /// Issue a token carrying request metadata (source address, user agent).
    pub async fn issue_with_metadata(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        metadata: Metadata,
    ) -> Result<Token, Error> {
        self.issue_inner(user_id, token_type, None, metadata).await
    }

    async fn issue_inner(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        expires_at: Option<DateTime<Utc>>,
        metadata: Metadata,
    ) -> Result<Token, Error> {
        let now = Utc::now();
        let mut data = NewToken::new(
            user_id.clone(),
            token_type,
            generate_token_value(),
            &self.config,
            now,
        )
        .with_metadata(metadata);

        if let Some(expires_at) = expires_at {
            data = data.with_expires_at(expires_at);
        }

        let token = self.repository.create(data, TokenId::new_random()).await?;

        tracing::debug!(
            user_id = %user_id,
            token_type = %token_type,
            expires_at = %token.expires_at,
            "Issued token"
        );

        Ok(token)
    }

    /// Resolve a presented value to its token.
    ///
    /// Fails uniformly with [`AuthError::InvalidCredentials`] when the value
    /// is unknown, the token is invalid, or the purpose does not match.
    pub async fn validate(
        &self,
        value: &str,
        token_type: Option<TokenType>,
    ) -> Result<Token, Error> {
        self.repository
            .validate(value, token_type)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))
    }

    /// Revoke one token by id.
    pub async fn revoke(&self, id: &TokenId) -> Result<Token, Error> {
        self.repository.revoke(id).await
    }

    /// Revoke all of a user's tokens, optionally restricted to one purpose.
    /// Returns the number of tokens revoked.
    pub async fn revoke_all_for_user(
        &self,
        user_id: &UserId,
        token_type: Option<TokenType>,
    ) -> Result<u64, Error> {
        let count = self
            .repository
            .revoke_all_for_user(user_id, token_type)
            .await?;

        if count > 0 {
            tracing::info!(user_id = %user_id, count = count, "Revoked tokens for user");
        }

        Ok(count)
    }

    /// Start the background cleanup task.
    ///
    /// Spawns a task that periodically deletes expired tokens past their
    /// grace period and revoked tokens past the retention window.
    pub fn start_cleanup_task(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let retention_hours = self.config.revoked_retention_hours;

        // Cleanup runs hourly
        const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(CLEANUP_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        match repository.delete_expired().await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Deleted expired tokens");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to delete expired tokens");
                            }
                            _ => {}
                        }

                        match repository.delete_revoked_older_than(retention_hours).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Deleted stale revoked tokens");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to delete revoked tokens");
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down token cleanup task");
                        break;
                    }
                }
            }
        })
    }
}
