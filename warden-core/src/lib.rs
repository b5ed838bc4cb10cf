//! Core functionality for the warden authentication backend
//!
//! This crate contains the domain layer of warden: immutable entities
//! carrying the account lockout and token lifecycle policy, the repository
//! contracts the persistence layer implements, the identity provider
//! contract, and the services that coordinate them.
//!
//! The policy core is pure: every time-dependent decision is a function of an
//! entity snapshot plus an explicit `now`, and every mutator returns a new
//! snapshot. Persistence, HTTP, and the hosted identity provider live outside
//! this crate and plug in through the traits in [`repositories`].
//!
//! See [`failed_login::FailedLoginRecord`] for the lockout policy and
//! [`token::Token`] for the token lifecycle.

pub mod app;
pub mod error;
pub mod failed_login;
pub mod id;
pub mod repositories;
pub mod services;
pub mod token;
pub mod user;
pub mod validation;

pub use app::{App, AppId};
pub use error::Error;
pub use failed_login::{FailedLoginRecord, LockoutConfig};
pub use token::{Token, TokenId, TokenTtlConfig, TokenType};
pub use user::{User, UserId};

/// Open key-value map carried by entities for auditing context
/// (source address, user agent, client hints).
pub type Metadata = serde_json::Map<String, serde_json::Value>;
