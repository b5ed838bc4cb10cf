//! Identity provider contract.
//!
//! Registration, credential checks, and password changes are delegated to a
//! hosted identity service. This trait is the seam the rest of the crate
//! programs against; the concrete client lives outside the core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Error, User, UserId,
    user::{NewUser, UpdateUser},
};

/// Login credentials submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Contract for the hosted identity service.
///
/// Implementations map provider responses onto the crate's error taxonomy:
/// bad credentials become [`crate::error::AuthError::InvalidCredentials`],
/// duplicate registrations become
/// [`crate::error::AuthError::UserAlreadyExists`], and transport failures
/// become [`crate::error::AuthError::ProviderUnavailable`].
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Create an account with the provider.
    async fn register(&self, data: &NewUser) -> Result<User, Error>;

    /// Check credentials, returning the profile on success.
    async fn login(&self, credentials: &Credentials) -> Result<User, Error>;

    /// Invalidate the provider-side session for a user.
    async fn logout(&self, user_id: &UserId) -> Result<(), Error>;

    /// Apply a profile patch on the provider side.
    async fn update_user(&self, user_id: &UserId, patch: &UpdateUser) -> Result<User, Error>;

    /// Replace a user's password.
    async fn reset_password(&self, user_id: &UserId, new_password: &str) -> Result<(), Error>;
}
