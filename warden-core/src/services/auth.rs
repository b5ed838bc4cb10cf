//! Authentication orchestration.
//!
//! Glues the identity provider, the lockout service, and the token service
//! into the register/login/logout and password-reset flows. The service adds
//! no policy of its own: lockout decisions come from
//! [`crate::failed_login`], token decisions from [`crate::token`], and
//! credential checks from the provider.

use std::sync::Arc;

use serde_json::json;

use crate::{
    Error, Metadata, User, UserId,
    error::AuthError,
    repositories::{AuthProvider, Credentials, FailedLoginRepository, TokenRepository},
    services::{LockoutService, TokenService},
    token::{Token, TokenType},
    user::{NewUser, UpdateUser},
    validation::{validate_email, validate_name, validate_password, validate_phone},
};

/// The result of a successful login: the profile plus a fresh token pair.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub access_token: Token,
    pub refresh_token: Token,
}

/// A rotated access/refresh pair. Produced by [`AuthService::refresh`],
/// which never consults the provider and so carries no profile.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub user_id: UserId,
    pub access_token: Token,
    pub refresh_token: Token,
}

/// Service for the authentication flows.
pub struct AuthService<P, F, T>
where
    P: AuthProvider,
    F: FailedLoginRepository,
    T: TokenRepository,
{
    provider: Arc<P>,
    lockout: LockoutService<F>,
    tokens: TokenService<T>,
}

impl<P, F, T> AuthService<P, F, T>
where
    P: AuthProvider,
    F: FailedLoginRepository,
    T: TokenRepository,
{
    pub fn new(provider: Arc<P>, lockout: LockoutService<F>, tokens: TokenService<T>) -> Self {
        Self {
            provider,
            lockout,
            tokens,
        }
    }

    /// Register a new user.
    ///
    /// Validates the submitted data, delegates account creation to the
    /// provider, and issues an email verification token for the caller to
    /// deliver.
    pub async fn register(&self, data: &NewUser) -> Result<(User, Token), Error> {
        validate_email(&data.email)?;
        validate_password(&data.password)?;
        validate_name(&data.name)?;
        if let Some(phone) = &data.phone {
            validate_phone(phone)?;
        }

        let user = self.provider.register(data).await?;

        let verification = self
            .tokens
            .issue(&user.id, TokenType::EmailVerification)
            .await?;

        tracing::info!(user_id = %user.id, "Registered user");

        Ok((user, verification))
    }

    /// Authenticate a user and issue an access/refresh token pair.
    ///
    /// The lockout gate runs before the provider is consulted, so a locked
    /// pair is rejected without a credential check. Failed checks are
    /// recorded against the submitted email, whether or not the user exists.
    pub async fn login(
        &self,
        credentials: &Credentials,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> Result<AuthenticatedUser, Error> {
        let status = self.lockout.check(&credentials.email, ip_address).await?;
        if status.is_locked {
            return Err(AuthError::AccountLocked {
                retry_after_minutes: status.retry_after_minutes,
            }
            .into());
        }

        let user = match self.provider.login(credentials).await {
            Ok(user) => user,
            Err(Error::Auth(AuthError::InvalidCredentials)) => {
                let status = self
                    .lockout
                    .record_failure(&credentials.email, ip_address, user_agent)
                    .await?;

                // Surface the lockout as soon as the failed attempt triggers
                // it; earlier failures stay indistinguishable
                if status.is_locked {
                    return Err(AuthError::AccountLocked {
                        retry_after_minutes: status.retry_after_minutes,
                    }
                    .into());
                }
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        self.lockout
            .record_success(&credentials.email, ip_address)
            .await?;

        let metadata = request_metadata(ip_address, user_agent);
        let access_token = self
            .tokens
            .issue_with_metadata(&user.id, TokenType::Access, metadata.clone())
            .await?;
        let refresh_token = self
            .tokens
            .issue_with_metadata(&user.id, TokenType::Refresh, metadata)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthenticatedUser {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a valid refresh token for a fresh access/refresh pair,
    /// revoking the presented token.
    pub async fn refresh(&self, refresh_value: &str) -> Result<TokenPair, Error> {
        let presented = self
            .tokens
            .validate(refresh_value, Some(TokenType::Refresh))
            .await?;

        self.tokens.revoke(&presented.id).await?;

        let access_token = self
            .tokens
            .issue_with_metadata(&presented.user_id, TokenType::Access, presented.metadata.clone())
            .await?;
        let refresh_token = self
            .tokens
            .issue_with_metadata(&presented.user_id, TokenType::Refresh, presented.metadata.clone())
            .await?;

        Ok(TokenPair {
            user_id: presented.user_id.clone(),
            access_token,
            refresh_token,
        })
    }

    /// Log a user out: revoke their session tokens and invalidate the
    /// provider-side session. Returns the number of tokens revoked.
    pub async fn logout(&self, user_id: &UserId) -> Result<u64, Error> {
        let access = self
            .tokens
            .revoke_all_for_user(user_id, Some(TokenType::Access))
            .await?;
        let refresh = self
            .tokens
            .revoke_all_for_user(user_id, Some(TokenType::Refresh))
            .await?;

        self.provider.logout(user_id).await?;

        tracing::info!(user_id = %user_id, revoked = access + refresh, "User logged out");

        Ok(access + refresh)
    }

    /// Apply a profile patch through the provider.
    pub async fn update_user(&self, user_id: &UserId, patch: &UpdateUser) -> Result<User, Error> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(phone) = &patch.phone {
            validate_phone(phone)?;
        }

        self.provider.update_user(user_id, patch).await
    }

    /// Issue a password reset token for the caller to deliver.
    pub async fn request_password_reset(&self, user_id: &UserId) -> Result<Token, Error> {
        self.tokens.issue(user_id, TokenType::ResetPassword).await
    }

    /// Complete a password reset: consume the token, set the new password,
    /// and revoke the user's outstanding session tokens.
    pub async fn reset_password(&self, token_value: &str, new_password: &str) -> Result<(), Error> {
        validate_password(new_password)?;

        let token = self
            .tokens
            .validate(token_value, Some(TokenType::ResetPassword))
            .await?;

        self.provider
            .reset_password(&token.user_id, new_password)
            .await?;

        self.tokens.revoke(&token.id).await?;
        // Outstanding sessions die with the old password
        self.tokens
            .revoke_all_for_user(&token.user_id, Some(TokenType::Access))
            .await?;
        self.tokens
            .revoke_all_for_user(&token.user_id, Some(TokenType::Refresh))
            .await?;

        tracing::info!(user_id = %token.user_id, "Password reset completed");

        Ok(())
    }

    /// Consume an email verification token, returning the verified user id.
    ///
    /// The caller marks the profile verified through its user repository.
    pub async fn verify_email(&self, token_value: &str) -> Result<UserId, Error> {
        let token = self
            .tokens
            .validate(token_value, Some(TokenType::EmailVerification))
            .await?;

        self.tokens.revoke(&token.id).await?;

        Ok(token.user_id)
    }
}

fn request_metadata(ip_address: &str, user_agent: Option<&str>) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("ip_address".to_string(), json!(ip_address));
    if let Some(user_agent) = user_agent {
        metadata.insert("user_agent".to_string(), json!(user_agent));
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failed_login::LockoutConfig;
    use crate::token::TokenTtlConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock identity provider backed by an email -> (password, user) map
    struct MockAuthProvider {
        accounts: Mutex<HashMap<String, (String, User)>>,
        logouts: Mutex<Vec<UserId>>,
    }

    impl MockAuthProvider {
        fn new() -> Self {
            Self {
                accounts: Mutex::new(HashMap::new()),
                logouts: Mutex::new(Vec::new()),
            }
        }

        fn with_account(email: &str, password: &str) -> Arc<Self> {
            let provider = Self::new();
            let user = User::builder()
                .email(email.to_string())
                .name("Test User".to_string())
                .build()
                .unwrap();
            provider
                .accounts
                .lock()
                .unwrap()
                .insert(email.to_string(), (password.to_string(), user));
            Arc::new(provider)
        }
    }

    #[async_trait]
    impl AuthProvider for MockAuthProvider {
        async fn register(&self, data: &NewUser) -> Result<User, Error> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(&data.email) {
                return Err(AuthError::UserAlreadyExists.into());
            }

            let user = User::builder()
                .email(data.email.clone())
                .name(data.name.clone())
                .phone(data.phone.clone())
                .build()?;
            accounts.insert(data.email.clone(), (data.password.clone(), user.clone()));
            Ok(user)
        }

        async fn login(&self, credentials: &Credentials) -> Result<User, Error> {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(&credentials.email) {
                Some((password, user)) if password == &credentials.password => Ok(user.clone()),
                _ => Err(AuthError::InvalidCredentials.into()),
            }
        }

        async fn logout(&self, user_id: &UserId) -> Result<(), Error> {
            self.logouts.lock().unwrap().push(user_id.clone());
            Ok(())
        }

        async fn update_user(&self, user_id: &UserId, patch: &UpdateUser) -> Result<User, Error> {
            let mut accounts = self.accounts.lock().unwrap();
            for (_, user) in accounts.values_mut() {
                if &user.id == user_id {
                    *user = user.update(patch);
                    return Ok(user.clone());
                }
            }
            Err(AuthError::UserNotFound.into())
        }

        async fn reset_password(&self, user_id: &UserId, new_password: &str) -> Result<(), Error> {
            let mut accounts = self.accounts.lock().unwrap();
            for (password, user) in accounts.values_mut() {
                if &user.id == user_id {
                    *password = new_password.to_string();
                    return Ok(());
                }
            }
            Err(AuthError::UserNotFound.into())
        }
    }

    // The service tests reuse the mock repositories from the sibling
    // service modules' tests via fresh in-memory equivalents.
    use crate::failed_login::{FailedLoginRecord, NewFailedLogin};
    use crate::token::{NewToken, TokenId};
    use chrono::{DateTime, Duration, Utc};

    struct MemoryFailedLogins {
        records: Mutex<HashMap<(String, String), FailedLoginRecord>>,
    }

    impl MemoryFailedLogins {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(HashMap::new()),
            })
        }
    }

    #[async_trait]
    impl FailedLoginRepository for MemoryFailedLogins {
        async fn create(&self, data: NewFailedLogin) -> Result<FailedLoginRecord, Error> {
            let record = data.into_record(Utc::now());
            self.records.lock().unwrap().insert(
                (record.user_id.clone(), record.ip_address.clone()),
                record.clone(),
            );
            Ok(record)
        }

        async fn find_by_user_and_ip(
            &self,
            user_id: &str,
            ip_address: &str,
        ) -> Result<Option<FailedLoginRecord>, Error> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(&(user_id.to_string(), ip_address.to_string()))
                .cloned())
        }

        async fn increment_attempts(
            &self,
            user_id: &str,
            ip_address: &str,
        ) -> Result<FailedLoginRecord, Error> {
            let mut records = self.records.lock().unwrap();
            let key = (user_id.to_string(), ip_address.to_string());
            let now = Utc::now();
            let record = match records.get(&key) {
                Some(existing) => existing.increment_attempts(now),
                None => NewFailedLogin::new(user_id, ip_address).into_record(now),
            };
            records.insert(key, record.clone());
            Ok(record)
        }

        async fn reset_attempts(&self, user_id: &str, ip_address: &str) -> Result<(), Error> {
            let mut records = self.records.lock().unwrap();
            let key = (user_id.to_string(), ip_address.to_string());
            if let Some(record) = records.get(&key) {
                let reset = record.reset(Utc::now());
                records.insert(key, reset);
            }
            Ok(())
        }

        async fn is_account_locked(&self, _: &str, _: &str) -> Result<bool, Error> {
            unimplemented!("not exercised through AuthService")
        }

        async fn remaining_lockout_minutes(&self, _: &str, _: &str) -> Result<i64, Error> {
            unimplemented!("not exercised through AuthService")
        }

        async fn delete_expired(&self) -> Result<u64, Error> {
            Ok(0)
        }

        async fn cleanup_old_records(&self, _: DateTime<Utc>) -> Result<u64, Error> {
            Ok(0)
        }
    }

    struct MemoryTokens {
        tokens: Mutex<Vec<Token>>,
    }

    impl MemoryTokens {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                tokens: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TokenRepository for MemoryTokens {
        async fn create(&self, data: NewToken, id: TokenId) -> Result<Token, Error> {
            let token = data.into_token(id, Utc::now());
            self.tokens.lock().unwrap().push(token.clone());
            Ok(token)
        }

        async fn find_by_value(&self, value: &str) -> Result<Option<Token>, Error> {
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.value == value)
                .cloned())
        }

        async fn find_valid_by_user(
            &self,
            user_id: &UserId,
            token_type: Option<TokenType>,
        ) -> Result<Vec<Token>, Error> {
            let now = Utc::now();
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .iter()
                .filter(|t| {
                    t.belongs_to_user(user_id)
                        && t.is_valid(now)
                        && token_type.is_none_or(|ty| t.is_of_type(ty))
                })
                .cloned()
                .collect())
        }

        async fn revoke(&self, id: &TokenId) -> Result<Token, Error> {
            let mut tokens = self.tokens.lock().unwrap();
            let token = tokens
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or(Error::Token(crate::error::TokenError::NotFound))?;
            *token = token.revoke(Utc::now());
            Ok(token.clone())
        }

        async fn revoke_all_for_user(
            &self,
            user_id: &UserId,
            token_type: Option<TokenType>,
        ) -> Result<u64, Error> {
            let now = Utc::now();
            let mut count = 0;
            for token in self.tokens.lock().unwrap().iter_mut() {
                if token.belongs_to_user(user_id)
                    && !token.is_revoked()
                    && token_type.is_none_or(|ty| token.is_of_type(ty))
                {
                    *token = token.revoke(now);
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn validate(
            &self,
            value: &str,
            token_type: Option<TokenType>,
        ) -> Result<Option<Token>, Error> {
            let now = Utc::now();
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .iter()
                .find(|t| {
                    t.value == value
                        && t.is_valid(now)
                        && token_type.is_none_or(|ty| t.is_of_type(ty))
                })
                .cloned())
        }

        async fn delete_expired(&self) -> Result<u64, Error> {
            Ok(0)
        }

        async fn delete_revoked_older_than(&self, _hours: i64) -> Result<u64, Error> {
            Ok(0)
        }
    }

    type TestAuthService = AuthService<MockAuthProvider, MemoryFailedLogins, MemoryTokens>;

    fn auth_service(provider: Arc<MockAuthProvider>, config: LockoutConfig) -> TestAuthService {
        AuthService::new(
            provider,
            LockoutService::new(MemoryFailedLogins::new(), config),
            TokenService::new(MemoryTokens::new(), TokenTtlConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_register_issues_verification_token() {
        let service = auth_service(Arc::new(MockAuthProvider::new()), LockoutConfig::default());

        let (user, verification) = service
            .register(&NewUser::new("new@example.com", "Str0ngPass!", "Ada"))
            .await
            .unwrap();

        assert_eq!(user.email, "new@example.com");
        assert!(verification.is_of_type(TokenType::EmailVerification));
        assert!(verification.belongs_to_user(&user.id));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_before_provider() {
        let provider = Arc::new(MockAuthProvider::new());
        let service = auth_service(provider.clone(), LockoutConfig::default());

        let err = service
            .register(&NewUser::new("new@example.com", "weakpass", "Ada"))
            .await
            .unwrap_err();

        assert!(err.is_validation_error());
        // The provider never saw the registration
        assert!(provider.accounts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let provider = MockAuthProvider::with_account("dup@example.com", "Str0ngPass!");
        let service = auth_service(provider, LockoutConfig::default());

        let err = service
            .register(&NewUser::new("dup@example.com", "Str0ngPass!", "Ada"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_success_issues_token_pair() {
        let provider = MockAuthProvider::with_account("user@example.com", "Str0ngPass!");
        let service = auth_service(provider, LockoutConfig::default());

        let authenticated = service
            .login(
                &Credentials::new("user@example.com", "Str0ngPass!"),
                "10.0.0.1",
                Some("curl/8.0"),
            )
            .await
            .unwrap();

        assert!(authenticated.access_token.is_of_type(TokenType::Access));
        assert!(authenticated.refresh_token.is_of_type(TokenType::Refresh));
        assert_eq!(
            authenticated.access_token.metadata.get("ip_address"),
            Some(&json!("10.0.0.1"))
        );
    }

    #[tokio::test]
    async fn test_login_failure_is_recorded() {
        let provider = MockAuthProvider::with_account("user@example.com", "Str0ngPass!");
        let service = auth_service(provider, LockoutConfig::default());

        let err = service
            .login(
                &Credentials::new("user@example.com", "wrong"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));

        let status = service
            .lockout
            .check("user@example.com", "10.0.0.1")
            .await
            .unwrap();
        assert_eq!(status.attempts, 1);
    }

    #[tokio::test]
    async fn test_lockout_gate_blocks_even_correct_password() {
        let provider = MockAuthProvider::with_account("user@example.com", "Str0ngPass!");
        let config = LockoutConfig {
            max_attempts: 3,
            lockout_duration: Duration::minutes(30),
            cleanup_after: Duration::days(30),
        };
        let service = auth_service(provider, config);

        for _ in 0..2 {
            let err = service
                .login(
                    &Credentials::new("user@example.com", "wrong"),
                    "10.0.0.1",
                    None,
                )
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
        }

        // The locking attempt itself reports the lockout
        let err = service
            .login(
                &Credentials::new("user@example.com", "wrong"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AccountLocked { .. })));

        // The right password is rejected while the lockout holds
        let err = service
            .login(
                &Credentials::new("user@example.com", "Str0ngPass!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap_err();
        let Error::Auth(AuthError::AccountLocked { retry_after_minutes }) = err else {
            panic!("expected AccountLocked, got {err:?}");
        };
        assert!(retry_after_minutes > 0 && retry_after_minutes <= 30);

        // A different source address is unaffected
        let authenticated = service
            .login(
                &Credentials::new("user@example.com", "Str0ngPass!"),
                "10.0.0.2",
                None,
            )
            .await
            .unwrap();
        assert_eq!(authenticated.user.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_login_success_resets_counter() {
        let provider = MockAuthProvider::with_account("user@example.com", "Str0ngPass!");
        let service = auth_service(provider, LockoutConfig::default());

        for _ in 0..3 {
            let _ = service
                .login(
                    &Credentials::new("user@example.com", "wrong"),
                    "10.0.0.1",
                    None,
                )
                .await;
        }

        service
            .login(
                &Credentials::new("user@example.com", "Str0ngPass!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap();

        let status = service
            .lockout
            .check("user@example.com", "10.0.0.1")
            .await
            .unwrap();
        assert_eq!(status.attempts, 0);
    }

    #[tokio::test]
    async fn test_logout_revokes_session_tokens() {
        let provider = MockAuthProvider::with_account("user@example.com", "Str0ngPass!");
        let service = auth_service(provider.clone(), LockoutConfig::default());

        let authenticated = service
            .login(
                &Credentials::new("user@example.com", "Str0ngPass!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap();

        let revoked = service.logout(&authenticated.user.id).await.unwrap();
        assert_eq!(revoked, 2);
        assert_eq!(provider.logouts.lock().unwrap().len(), 1);

        // The pair is dead
        let err = service
            .tokens
            .validate(&authenticated.access_token.value, Some(TokenType::Access))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_the_pair() {
        let provider = MockAuthProvider::with_account("user@example.com", "Str0ngPass!");
        let service = auth_service(provider, LockoutConfig::default());

        let authenticated = service
            .login(
                &Credentials::new("user@example.com", "Str0ngPass!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap();

        let rotated = service
            .refresh(&authenticated.refresh_token.value)
            .await
            .unwrap();
        assert_ne!(rotated.refresh_token.value, authenticated.refresh_token.value);

        // The presented refresh token is consumed
        let err = service
            .refresh(&authenticated.refresh_token.value)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let provider = MockAuthProvider::with_account("user@example.com", "OldPass1!");
        let service = auth_service(provider, LockoutConfig::default());

        let authenticated = service
            .login(
                &Credentials::new("user@example.com", "OldPass1!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap();
        let user_id = authenticated.user.id.clone();

        let reset = service.request_password_reset(&user_id).await.unwrap();
        assert!(reset.is_of_type(TokenType::ResetPassword));

        service
            .reset_password(&reset.value, "NewPass1!")
            .await
            .unwrap();

        // Old password no longer works, new one does
        let err = service
            .login(
                &Credentials::new("user@example.com", "OldPass1!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
        service
            .login(
                &Credentials::new("user@example.com", "NewPass1!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap();

        // The reset token is consumed; outstanding sessions are revoked
        let err = service
            .reset_password(&reset.value, "Another1!")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
        let err = service
            .tokens
            .validate(&authenticated.refresh_token.value, Some(TokenType::Refresh))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_verify_email_consumes_token() {
        let service = auth_service(Arc::new(MockAuthProvider::new()), LockoutConfig::default());

        let (user, verification) = service
            .register(&NewUser::new("new@example.com", "Str0ngPass!", "Ada"))
            .await
            .unwrap();

        let verified_id = service.verify_email(&verification.value).await.unwrap();
        assert_eq!(verified_id, user.id);

        let err = service.verify_email(&verification.value).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_update_user_validates_patch() {
        let provider = MockAuthProvider::with_account("user@example.com", "Str0ngPass!");
        let service = auth_service(provider, LockoutConfig::default());

        let authenticated = service
            .login(
                &Credentials::new("user@example.com", "Str0ngPass!"),
                "10.0.0.1",
                None,
            )
            .await
            .unwrap();

        let err = service
            .update_user(
                &authenticated.user.id,
                &UpdateUser {
                    phone: Some("not-a-phone".to_string()),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation_error());

        let updated = service
            .update_user(
                &authenticated.user.id,
                &UpdateUser {
                    name: Some("Grace".to_string()),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Grace");
    }
}
