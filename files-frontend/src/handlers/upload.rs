use crate::auth::{AuthSession, CurrentUser};
use crate::models::{FileRecord, SignedInUser};
use crate::router::{Location, LOGIN_PATH, REDIRECT_QUERY_KEY};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use service_core::error::AppError;
use tower_sessions::Session;
use uuid::Uuid;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub user_name: Option<String>,
    pub error: Option<String>,
}

struct UploadedFile {
    name: String,
    content_type: String,
    data: Vec<u8>,
}

pub async fn upload_page(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    UploadTemplate {
        user_name: Some(user.display_name().to_string()),
        error: None,
    }
}

/// Keep object names to a conservative character set.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("file").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("upload interrupted: {}", e)))?;

        if data.is_empty() {
            return Ok(None);
        }

        return Ok(Some(UploadedFile {
            name,
            content_type,
            data: data.to_vec(),
        }));
    }

    Ok(None)
}

fn upload_error(user_name: &str, status: StatusCode, message: &str) -> Response {
    (
        status,
        UploadTemplate {
            user_name: Some(user_name.to_string()),
            error: Some(message.to_string()),
        },
    )
        .into_response()
}

/// Put the file into storage, then record its metadata. The stored object is
/// removed again when the record cannot be written.
async fn store_upload(
    state: &AppState,
    user: &SignedInUser,
    file: UploadedFile,
) -> Result<(), AppError> {
    let UploadedFile {
        name,
        content_type,
        data,
    } = file;

    let id = Uuid::new_v4().to_string();
    let path = format!("users/{}/{}-{}", user.uid, id, sanitize_file_name(&name));
    let size = data.len() as u64;

    let storage = state.backend.storage();
    let stored = storage
        .upload(&path, &content_type, data, &user.id_token)
        .await?;

    let record = FileRecord {
        id,
        name,
        content_type,
        size: stored.size_bytes().unwrap_or(size),
        download_token: stored.download_token().map(str::to_string),
        storage_path: stored.name,
        uploaded_at: Utc::now(),
    };

    let recorded = state
        .backend
        .database()
        .create_file_record(&user.uid, &record, &user.id_token)
        .await;

    if recorded.is_err() {
        if let Err(e) = storage.delete(&record.storage_path, &user.id_token).await {
            tracing::warn!(
                object = %record.storage_path,
                error = %e,
                "Failed to remove object after metadata write failed"
            );
        }
    }

    recorded
}

pub async fn upload_handler(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Response {
    let file = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return upload_error(
                user.display_name(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "Choose a non-empty file to upload",
            );
        }
        Err(e) => {
            return upload_error(user.display_name(), e.status_code(), "The upload could not be read");
        }
    };

    let result = store_upload(&state, &user, file).await;

    match result {
        Ok(()) => Redirect::to("/dashboard").into_response(),
        Err(AppError::Unauthorized(_)) => {
            // The stored token was rejected; start over from the sign-in page.
            if let Err(e) = AuthSession::sign_out(&session).await {
                tracing::warn!(error = %e, "Failed to clear rejected session");
            }
            let login = Location::new(LOGIN_PATH).with_query(REDIRECT_QUERY_KEY, "/upload");
            Redirect::to(&login.full_path()).into_response()
        }
        Err(e) => {
            tracing::error!(uid = %user.uid, error = %e, "Upload failed");
            upload_error(user.display_name(), e.status_code(), "Upload failed, please try again")
        }
    }
}
