//! Repository trait for user profiles.

use async_trait::async_trait;

use crate::{
    Error, User, UserId,
    user::UpdateUser,
};

/// Repository for locally persisted user profiles.
///
/// The identity provider owns authentication; this repository mirrors the
/// profile data the rest of the system reads.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a profile snapshot.
    async fn create(&self, user: &User) -> Result<User, Error>;

    /// Fetch a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Fetch a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Apply a profile patch. Returns the updated snapshot.
    async fn update(&self, id: &UserId, patch: &UpdateUser) -> Result<User, Error>;

    /// Delete a user by id.
    async fn delete(&self, id: &UserId) -> Result<(), Error>;

    /// Mark a user's email as verified.
    async fn set_email_verified(&self, id: &UserId) -> Result<(), Error>;
}
