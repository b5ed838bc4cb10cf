//! Repository traits for the data access layer
//!
//! This module defines the interfaces the services use to reach storage and
//! the hosted identity provider. The crate ships no implementations; backends
//! live outside and plug in through these traits.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] is a supertrait combining all provider traits plus
//!   a lifecycle health check
//!
//! Backends can implement only the repositories they need, or the full
//! [`RepositoryProvider`] to drive the whole service layer from one value.

pub mod app;
pub mod auth;
pub mod failed_login;
pub mod token;
pub mod user;

pub use app::AppRepository;
pub use auth::{AuthProvider, Credentials};
pub use failed_login::FailedLoginRepository;
pub use token::TokenRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for failed login repository access.
pub trait FailedLoginRepositoryProvider: Send + Sync + 'static {
    /// The failed login repository implementation type
    type FailedLoginRepo: FailedLoginRepository;

    /// Get the failed login repository
    fn failed_login(&self) -> &Self::FailedLoginRepo;
}

/// Provider trait for token repository access.
pub trait TokenRepositoryProvider: Send + Sync + 'static {
    /// The token repository implementation type
    type TokenRepo: TokenRepository;

    /// Get the token repository
    fn token(&self) -> &Self::TokenRepo;
}

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    /// The user repository implementation type
    type UserRepo: UserRepository;

    /// Get the user repository
    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for app repository access.
pub trait AppRepositoryProvider: Send + Sync + 'static {
    /// The app repository implementation type
    type AppRepo: AppRepository;

    /// Get the app repository
    fn app(&self) -> &Self::AppRepo;
}

/// Provider trait that storage backends implement to expose all repositories.
///
/// A supertrait combining the individual provider traits plus a lifecycle
/// health check, so applications can wire the full service layer from a
/// single storage value.
#[async_trait]
pub trait RepositoryProvider:
    FailedLoginRepositoryProvider + TokenRepositoryProvider + UserRepositoryProvider + AppRepositoryProvider
{
    /// Health check across all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
