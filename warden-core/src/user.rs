//! User profiles
//!
//! This module contains the core user struct and related data types.
//!
//! A [`User`] is the profile snapshot returned by the identity provider after
//! registration or login. The core user struct is defined as follows:
//!
//! | Field            | Type             | Description                                  |
//! | ---------------- | ---------------- | -------------------------------------------- |
//! | `id`             | `UserId`         | The unique identifier for the user.          |
//! | `email`          | `String`         | The email of the user.                       |
//! | `name`           | `String`         | The name of the user.                        |
//! | `email_verified` | `bool`           | Whether the user has verified their email.   |
//! | `phone`          | `Option<String>` | The phone number of the user, when provided. |
//! | `avatar_url`     | `Option<String>` | The avatar URL of the user, when provided.   |

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, validate_prefixed_id},
};

/// A unique, stable identifier for a specific user
/// This value should be treated as opaque, and should not be used as a UUID even if it may look like one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: &str) -> Self {
        UserId(id.to_string())
    }

    pub fn new_random() -> Self {
        UserId(generate_prefixed_id("usr"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this ID has the correct format for a user ID
    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "usr")
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile snapshot for one user, as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    pub email: String,

    pub name: String,

    pub email_verified: bool,

    pub phone: Option<String>,

    pub avatar_url: Option<String>,
}

/// A user profile with verification state redacted, safe to return to
/// arbitrary callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified
    }

    /// Whether name and email are present and the email is verified.
    pub fn has_complete_profile(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && self.email_verified
    }

    /// Apply a profile patch, returning the updated snapshot. Unset patch
    /// fields keep their current values.
    pub fn update(&self, patch: &UpdateUser) -> Self {
        Self {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            phone: patch.phone.clone().or_else(|| self.phone.clone()),
            avatar_url: patch.avatar_url.clone().or_else(|| self.avatar_url.clone()),
            ..self.clone()
        }
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    email: Option<String>,
    name: Option<String>,
    email_verified: bool,
    phone: Option<String>,
    avatar_url: Option<String>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn email_verified(mut self, email_verified: bool) -> Self {
        self.email_verified = email_verified;
        self
    }

    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    pub fn avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
        self
    }

    pub fn build(self) -> Result<User, Error> {
        Ok(User {
            id: self.id.unwrap_or_default(),
            email: self.email.ok_or(ValidationError::MissingField(
                "Email is required".to_string(),
            ))?,
            name: self.name.ok_or(ValidationError::MissingField(
                "Name is required".to_string(),
            ))?,
            email_verified: self.email_verified,
            phone: self.phone,
            avatar_url: self.avatar_url,
        })
    }
}

/// Registration data forwarded to the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Profile patch; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}
