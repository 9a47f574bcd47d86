use crate::auth::AuthState;
use crate::handlers::user_name;
use askama::Template;
use axum::{http::StatusCode, response::IntoResponse, Extension};

#[derive(Template)]
#[template(path = "public.html")]
pub struct PublicTemplate {
    pub user_name: Option<String>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub user_name: Option<String>,
}

pub async fn public_page(auth: Option<Extension<AuthState>>) -> impl IntoResponse {
    PublicTemplate {
        user_name: user_name(auth),
    }
}

pub async fn not_found(auth: Option<Extension<AuthState>>) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            user_name: user_name(auth),
        },
    )
}

pub async fn health_check() -> &'static str {
    "OK"
}
