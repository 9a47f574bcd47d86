use crate::auth::IdentityClient;
use crate::backend::{DatabaseClient, StorageClient};
use crate::config::BackendSettings;
use once_cell::sync::OnceCell;
use reqwest::Client;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;

/// The initialised backend project: validated settings plus the shared HTTP
/// client every handle issues requests through.
pub struct BackendProject {
    settings: Arc<BackendSettings>,
    http: Client,
    storage: OnceCell<Arc<StorageClient>>,
    database: OnceCell<Arc<DatabaseClient>>,
    identity: OnceCell<Arc<IdentityClient>>,
}

impl BackendProject {
    /// Validate `settings` and bind a project to them.
    ///
    /// Invalid settings are a fatal startup condition for callers.
    pub fn initialize(settings: BackendSettings) -> Result<Self, AppError> {
        settings.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("HTTP client: {}", e)))?;

        tracing::info!(
            project_id = %settings.project_id,
            bucket = %settings.storage_bucket,
            "Backend project initialized"
        );

        Ok(Self {
            settings: Arc::new(settings),
            http,
            storage: OnceCell::new(),
            database: OnceCell::new(),
            identity: OnceCell::new(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.settings.project_id
    }

    /// Storage handle. Created on first call; every call returns the same one.
    pub fn storage(&self) -> Arc<StorageClient> {
        self.storage
            .get_or_init(|| {
                tracing::debug!("Creating storage handle");
                Arc::new(StorageClient::new(self.http.clone(), self.settings.clone()))
            })
            .clone()
    }

    /// Document database handle. Created on first call; every call returns
    /// the same one.
    pub fn database(&self) -> Arc<DatabaseClient> {
        self.database
            .get_or_init(|| {
                tracing::debug!("Creating database handle");
                Arc::new(DatabaseClient::new(self.http.clone(), self.settings.clone()))
            })
            .clone()
    }

    /// Identity handle used to sign users in.
    pub fn identity(&self) -> Arc<IdentityClient> {
        self.identity
            .get_or_init(|| Arc::new(IdentityClient::new(self.http.clone(), self.settings.clone())))
            .clone()
    }
}
