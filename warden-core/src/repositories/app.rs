//! Repository trait for registered applications.

use async_trait::async_trait;

use crate::{
    Error,
    app::{App, AppId, NewApp, UpdateApp},
};

/// Repository for registered client applications.
#[async_trait]
pub trait AppRepository: Send + Sync + 'static {
    /// Register a new application, assigning its id and API key.
    async fn create(&self, data: NewApp) -> Result<App, Error>;

    /// Fetch an app by id.
    async fn find_by_id(&self, id: &AppId) -> Result<Option<App>, Error>;

    /// Fetch an app by API key. Used on every authenticated request, so
    /// implementations should index the key column.
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<App>, Error>;

    /// Apply a patch. Returns the updated snapshot.
    async fn update(&self, id: &AppId, patch: &UpdateApp) -> Result<App, Error>;

    /// Delete an app by id.
    async fn delete(&self, id: &AppId) -> Result<(), Error>;
}
