use crate::auth::{AuthSession, AuthState};
use crate::handlers::user_name;
use crate::router::LOGIN_PATH;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

/// Where to go after signing in when no usable target was requested.
pub const DEFAULT_AFTER_LOGIN: &str = "/dashboard";

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub user_name: Option<String>,
    pub redirect: String,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Validate a post-login target. Only local absolute paths are followed;
/// anything else (other hosts, protocol-relative URLs, the login page
/// itself) falls back to the dashboard.
pub fn post_login_target(requested: Option<&str>) -> &str {
    match requested {
        Some(target)
            if target.starts_with('/')
                && !target.starts_with("//")
                && !target.contains('\\')
                && !target.starts_with(LOGIN_PATH) =>
        {
            target
        }
        _ => DEFAULT_AFTER_LOGIN,
    }
}

pub async fn login_page(
    auth: Option<Extension<AuthState>>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let target = post_login_target(query.redirect.as_deref()).to_string();

    if let Some(Extension(AuthState::SignedIn(_))) = &auth {
        return Redirect::to(&target).into_response();
    }

    LoginTemplate {
        user_name: user_name(auth),
        redirect: target,
        email: String::new(),
        error: None,
    }
    .into_response()
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let target = post_login_target(form.redirect.as_deref()).to_string();
    let identity = state.backend.identity();

    match identity.sign_in(&form.email, &form.password).await {
        Ok(user) => {
            if let Err(e) = AuthSession::sign_in(&session, &user).await {
                return e.into_response();
            }

            tracing::info!(uid = %user.uid, target = %target, "Signed in, continuing navigation");
            Redirect::to(&target).into_response()
        }
        Err(AppError::Unauthorized(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate {
                user_name: None,
                redirect: target,
                email: form.email,
                error: Some("Invalid email or password".to_string()),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Sign-in failed");
            (
                e.status_code(),
                LoginTemplate {
                    user_name: None,
                    redirect: target,
                    email: form.email,
                    error: Some("Sign-in is unavailable right now, please try again".to_string()),
                },
            )
                .into_response()
        }
    }
}

pub async fn logout_handler(session: Session) -> Result<Redirect, AppError> {
    AuthSession::sign_out(&session).await?;
    tracing::info!("Signed out");
    Ok(Redirect::to("/public"))
}
