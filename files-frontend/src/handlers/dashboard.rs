use crate::auth::CurrentUser;
use crate::models::FileRecord;
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::IntoResponse};

pub struct FileRow {
    pub name: String,
    pub size: String,
    pub uploaded_at: String,
    pub url: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user_name: Option<String>,
    pub files: Vec<FileRow>,
    pub error: Option<String>,
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let storage = state.backend.storage();

    let (records, error) = match state
        .backend
        .database()
        .list_file_records(&user.uid, &user.id_token)
        .await
    {
        Ok(records) => (records, None),
        Err(e) => {
            tracing::error!(uid = %user.uid, error = %e, "Failed to list files");
            (Vec::new(), Some("Your files could not be loaded".to_string()))
        }
    };

    let files = records
        .iter()
        .map(|record: &FileRecord| FileRow {
            name: record.name.clone(),
            size: record.display_size(),
            uploaded_at: record.uploaded_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            url: storage.object_url(&record.storage_path, record.download_token.as_deref()),
        })
        .collect();

    DashboardTemplate {
        user_name: Some(user.display_name().to_string()),
        files,
        error,
    }
}
