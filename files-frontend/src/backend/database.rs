//! Document database handle.
//!
//! Documents travel in the database's typed-field representation, where each
//! field is an object with exactly one key naming its type, e.g.
//! `{"size": {"integerValue": "42"}}`. [`FieldValue`] models that shape as an
//! externally tagged enum.

use crate::backend::upstream_error;
use crate::config::BackendSettings;
use crate::models::FileRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    StringValue(String),
    /// int64 values are sent as decimal strings.
    IntegerValue(String),
    TimestampValue(String),
}

impl FieldValue {
    fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::StringValue(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Default)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

pub fn file_record_fields(record: &FileRecord) -> HashMap<&'static str, FieldValue> {
    let mut fields = HashMap::from([
        ("name", FieldValue::StringValue(record.name.clone())),
        ("contentType", FieldValue::StringValue(record.content_type.clone())),
        ("size", FieldValue::IntegerValue(record.size.to_string())),
        ("storagePath", FieldValue::StringValue(record.storage_path.clone())),
        (
            "uploadedAt",
            FieldValue::TimestampValue(record.uploaded_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        ),
    ]);

    if let Some(token) = &record.download_token {
        fields.insert("downloadToken", FieldValue::StringValue(token.clone()));
    }

    fields
}

/// Rebuild a [`FileRecord`] from a stored document. Documents missing a
/// required field, or carrying one of the wrong type, are skipped. The
/// download token is optional.
fn file_record_from_document(document: &Document) -> Option<FileRecord> {
    let field = |key: &str| -> Option<FieldValue> {
        document
            .fields
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    };

    let id = document.name.rsplit('/').next()?.to_string();
    let name = field("name")?.as_str()?.to_string();
    let content_type = field("contentType")?.as_str()?.to_string();
    let storage_path = field("storagePath")?.as_str()?.to_string();
    let size = match field("size")? {
        FieldValue::IntegerValue(s) => s.parse().ok()?,
        _ => return None,
    };
    let download_token = field("downloadToken").and_then(|value| value.as_str().map(str::to_string));
    let uploaded_at = match field("uploadedAt")? {
        FieldValue::TimestampValue(s) => DateTime::parse_from_rfc3339(&s).ok()?.with_timezone(&Utc),
        _ => return None,
    };

    Some(FileRecord {
        id,
        name,
        content_type,
        size,
        storage_path,
        download_token,
        uploaded_at,
    })
}

pub struct DatabaseClient {
    http: Client,
    settings: Arc<BackendSettings>,
}

impl DatabaseClient {
    pub(crate) fn new(http: Client, settings: Arc<BackendSettings>) -> Self {
        Self { http, settings }
    }

    pub fn project_id(&self) -> &str {
        &self.settings.project_id
    }

    /// Root of the project's default database.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            self.settings.database_endpoint.trim_end_matches('/'),
            self.project_id()
        )
    }

    fn files_collection(uid: &str) -> String {
        format!("users/{}/files", uid)
    }

    /// Store `record` under the user's file collection.
    pub async fn create_file_record(
        &self,
        uid: &str,
        record: &FileRecord,
        id_token: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/{}", self.documents_url(), Self::files_collection(uid));
        let body = serde_json::json!({ "fields": file_record_fields(record) });

        let response = self
            .http
            .traced_post(&url)
            .query(&[("documentId", record.id.as_str())])
            .bearer_auth(id_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database write request failed");
                AppError::BadGateway(format!("database write failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(upstream_error("database", response).await);
        }

        tracing::info!(uid, file_id = %record.id, "Recorded file metadata");
        Ok(())
    }

    /// All file records of the user, newest first.
    pub async fn list_file_records(
        &self,
        uid: &str,
        id_token: &str,
    ) -> Result<Vec<FileRecord>, AppError> {
        let url = format!("{}/{}", self.documents_url(), Self::files_collection(uid));

        let response = self
            .http
            .traced_get(&url)
            .bearer_auth(id_token)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("database read failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(upstream_error("database", response).await);
        }

        let listing: ListDocumentsResponse = response.json().await?;
        let mut records: Vec<FileRecord> = listing
            .documents
            .iter()
            .filter_map(file_record_from_document)
            .collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        Ok(records)
    }
}
