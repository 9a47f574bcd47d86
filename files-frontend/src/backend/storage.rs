//! File storage handle.
//!
//! Talks to the bucket's object REST interface. Object names contain `/`
//! and are always percent-encoded when placed in a URL path.

use crate::backend::upstream_error;
use crate::config::BackendSettings;
use reqwest::Client;
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::sync::Arc;

/// Metadata the storage service reports for one object.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub name: String,
    pub bucket: String,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Sent as a decimal string.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub time_created: Option<String>,
    /// Comma separated download tokens.
    #[serde(default)]
    pub download_tokens: Option<String>,
}

impl StoredObject {
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }

    /// First download token, if the service issued any.
    pub fn download_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
    }
}

#[derive(Debug, Deserialize, Default)]
struct ListResponse {
    #[serde(default)]
    items: Vec<StoredObject>,
}

pub struct StorageClient {
    http: Client,
    settings: Arc<BackendSettings>,
}

impl StorageClient {
    pub(crate) fn new(http: Client, settings: Arc<BackendSettings>) -> Self {
        Self { http, settings }
    }

    pub fn project_id(&self) -> &str {
        &self.settings.project_id
    }

    pub fn bucket(&self) -> &str {
        &self.settings.storage_bucket
    }

    fn objects_url(&self) -> String {
        format!(
            "{}/v0/b/{}/o",
            self.settings.storage_endpoint.trim_end_matches('/'),
            self.bucket()
        )
    }

    fn object_path_url(&self, path: &str) -> String {
        format!("{}/{}", self.objects_url(), urlencoding::encode(path))
    }

    /// Download URL of the object at `path`. With a `token` the link works
    /// without an `Authorization` header.
    pub fn object_url(&self, path: &str, token: Option<&str>) -> String {
        let url = format!("{}?alt=media", self.object_path_url(path));
        match token {
            Some(token) => format!("{}&token={}", url, urlencoding::encode(token)),
            None => url,
        }
    }

    /// Upload `data` as the object at `path` on behalf of the signed-in user.
    #[tracing::instrument(skip(self, data, id_token), fields(bucket = %self.bucket(), size = data.len()))]
    pub async fn upload(
        &self,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
        id_token: &str,
    ) -> Result<StoredObject, AppError> {
        let response = self
            .http
            .traced_post(&self.objects_url())
            .query(&[("uploadType", "media"), ("name", path)])
            .header("Authorization", &format!("Firebase {}", id_token))
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Storage upload request failed");
                AppError::BadGateway(format!("storage upload failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(upstream_error("storage", response).await);
        }

        let object: StoredObject = response.json().await?;
        tracing::info!(object = %object.name, "Stored object");
        Ok(object)
    }

    /// Objects whose names start with `prefix`.
    pub async fn list(&self, prefix: &str, id_token: &str) -> Result<Vec<StoredObject>, AppError> {
        let response = self
            .http
            .traced_get(&self.objects_url())
            .query(&[("prefix", prefix)])
            .header("Authorization", &format!("Firebase {}", id_token))
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("storage list failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(upstream_error("storage", response).await);
        }

        let listing: ListResponse = response.json().await?;
        Ok(listing.items)
    }

    /// Remove the object at `path`.
    #[tracing::instrument(skip(self, id_token), fields(bucket = %self.bucket()))]
    pub async fn delete(&self, path: &str, id_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .traced_delete(&self.object_path_url(path))
            .header("Authorization", &format!("Firebase {}", id_token))
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("storage delete failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(upstream_error("storage", response).await);
        }

        tracing::info!(object = %path, "Deleted object");
        Ok(())
    }
}
