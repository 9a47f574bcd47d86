//! Handles onto the hosted backend project.
//!
//! [`BackendProject`] is built once by the composition root from
//! [`BackendSettings`](crate::config::BackendSettings); the storage and
//! database handles it hands out are created lazily and shared for the rest
//! of the process.

pub mod database;
pub mod project;
pub mod storage;

pub use database::DatabaseClient;
pub use project::BackendProject;
pub use storage::{StorageClient, StoredObject};

use service_core::error::AppError;

/// Map a non-success upstream response to an [`AppError`].
pub(crate) async fn upstream_error(service: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    tracing::warn!(service, %status, body = %body, "Backend request rejected");

    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            AppError::Unauthorized(anyhow::anyhow!("{} rejected credentials", service))
        }
        reqwest::StatusCode::NOT_FOUND => {
            AppError::NotFound(anyhow::anyhow!("{} resource not found", service))
        }
        _ => AppError::BadGateway(format!("{} returned {}", service, status)),
    }
}
