//! Registered client applications
//!
//! An [`App`] is a client application allowed to call the API: it owns an
//! API key and an allowlist of origins. Mutators follow the same
//! replace-with-new-instance pattern as the rest of the domain layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, generate_secret, validate_prefixed_id},
    validation::validate_origin,
};

/// A unique, stable identifier for a registered application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: &str) -> Self {
        AppId(id.to_string())
    }

    pub fn new_random() -> Self {
        AppId(generate_prefixed_id("app"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "app")
    }
}

impl Default for AppId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered client application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: AppId,

    pub name: String,

    /// Secret presented by the client on every request.
    pub api_key: String,

    /// Origins allowed to call the API on behalf of this app. Never empty.
    pub allowed_origins: Vec<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// An app with the API key redacted, safe to return to arbitrary callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicApp {
    pub id: AppId,
    pub name: String,
    pub allowed_origins: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl App {
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }

    pub fn validate_api_key(&self, api_key: &str) -> bool {
        self.api_key == api_key
    }

    /// Add an origin to the allowlist. Returns an unchanged snapshot when the
    /// origin is already present.
    pub fn add_allowed_origin(&self, origin: &str, now: DateTime<Utc>) -> Self {
        if self.is_origin_allowed(origin) {
            return self.clone();
        }

        let mut allowed_origins = self.allowed_origins.clone();
        allowed_origins.push(origin.to_string());

        Self {
            allowed_origins,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Remove an origin from the allowlist.
    ///
    /// Fails when the removal would leave the app with no origins, since an
    /// app with an empty allowlist can never be called.
    pub fn remove_allowed_origin(&self, origin: &str, now: DateTime<Utc>) -> Result<Self, Error> {
        let allowed_origins: Vec<String> = self
            .allowed_origins
            .iter()
            .filter(|o| o.as_str() != origin)
            .cloned()
            .collect();

        if allowed_origins.is_empty() {
            return Err(ValidationError::InvalidOrigin(
                "Cannot remove the last allowed origin".to_string(),
            )
            .into());
        }

        Ok(Self {
            allowed_origins,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Apply a patch, returning the updated snapshot. Unset patch fields keep
    /// their current values. The API key never changes through this path.
    ///
    /// Fails when the patch would leave the app with no allowed origins.
    pub fn update(&self, patch: &UpdateApp, now: DateTime<Utc>) -> Result<Self, Error> {
        if patch.allowed_origins.as_ref().is_some_and(|o| o.is_empty()) {
            return Err(ValidationError::MissingField(
                "At least one allowed origin is required".to_string(),
            )
            .into());
        }

        Ok(Self {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            allowed_origins: patch
                .allowed_origins
                .clone()
                .unwrap_or_else(|| self.allowed_origins.clone()),
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn to_public(&self) -> PublicApp {
        PublicApp {
            id: self.id.clone(),
            name: self.name.clone(),
            allowed_origins: self.allowed_origins.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Data for registering a new application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApp {
    pub name: String,
    pub allowed_origins: Vec<String>,
}

impl NewApp {
    pub fn new(name: impl Into<String>, allowed_origins: Vec<String>) -> Self {
        Self {
            name: name.into(),
            allowed_origins,
        }
    }

    /// Materialize the app with a fresh id and API key. Repositories call
    /// this on create. Fails when no origin is supplied or an origin is
    /// malformed.
    pub fn into_app(self, now: DateTime<Utc>) -> Result<App, Error> {
        if self.allowed_origins.is_empty() {
            return Err(ValidationError::MissingField(
                "At least one allowed origin is required".to_string(),
            )
            .into());
        }
        for origin in &self.allowed_origins {
            validate_origin(origin)?;
        }

        Ok(App {
            id: AppId::new_random(),
            name: self.name,
            api_key: generate_secret(),
            allowed_origins: self.allowed_origins,
            created_at: now,
            updated_at: now,
        })
    }
}

/// App patch; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateApp {
    pub name: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample_app() -> App {
        NewApp::new("dashboard", vec!["https://app.example.com".to_string()])
            .into_app(base_time())
            .unwrap()
    }

    #[test]
    fn test_new_app() {
        let app = sample_app();

        assert!(app.id.is_valid());
        assert!(!app.api_key.is_empty());
        assert_eq!(app.allowed_origins.len(), 1);
        assert_ne!(app.api_key, sample_app().api_key);
    }

    #[test]
    fn test_new_app_requires_an_origin() {
        let result = NewApp::new("dashboard", vec![]).into_app(base_time());
        assert!(result.is_err());
    }

    #[test]
    fn test_new_app_rejects_malformed_origin() {
        let result = NewApp::new("dashboard", vec!["ftp://example.com".to_string()])
            .into_app(base_time());
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_validation() {
        let app = sample_app();

        assert!(app.validate_api_key(&app.api_key.clone()));
        assert!(!app.validate_api_key("wrong-key"));
    }

    #[test]
    fn test_origin_allowlist() {
        let app = sample_app();
        let now = base_time();

        assert!(app.is_origin_allowed("https://app.example.com"));
        assert!(!app.is_origin_allowed("https://evil.example.com"));

        let app = app.add_allowed_origin("https://staging.example.com", now);
        assert!(app.is_origin_allowed("https://staging.example.com"));
        assert_eq!(app.allowed_origins.len(), 2);

        // Adding an existing origin is a no-op
        let unchanged = app.add_allowed_origin("https://staging.example.com", now);
        assert_eq!(unchanged.allowed_origins.len(), 2);
    }

    #[test]
    fn test_remove_origin() {
        let now = base_time();
        let app = sample_app().add_allowed_origin("https://staging.example.com", now);

        let app = app.remove_allowed_origin("https://staging.example.com", now).unwrap();
        assert!(!app.is_origin_allowed("https://staging.example.com"));

        // Removing the last origin fails
        let result = app.remove_allowed_origin("https://app.example.com", now);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_preserves_api_key() {
        let now = base_time();
        let app = sample_app();
        let patch = UpdateApp {
            name: Some("dashboard-v2".to_string()),
            ..UpdateApp::default()
        };

        let updated = app.update(&patch, now + chrono::Duration::minutes(1)).unwrap();

        assert_eq!(updated.name, "dashboard-v2");
        assert_eq!(updated.api_key, app.api_key);
        assert_eq!(updated.allowed_origins, app.allowed_origins);
        assert!(updated.updated_at > app.updated_at);
    }

    #[test]
    fn test_update_rejects_empty_allowlist() {
        let app = sample_app();
        let patch = UpdateApp {
            allowed_origins: Some(vec![]),
            ..UpdateApp::default()
        };

        assert!(app.update(&patch, base_time()).is_err());
    }

    #[test]
    fn test_to_public_redacts_api_key() {
        let app = sample_app();
        let json = serde_json::to_value(app.to_public()).unwrap();

        assert!(json.get("api_key").is_none());
        assert_eq!(json.get("name").unwrap(), "dashboard");
    }
}
