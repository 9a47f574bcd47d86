pub mod app;
pub mod auth;
pub mod dashboard;
pub mod metrics;
pub mod upload;

use crate::auth::AuthState;
use axum::Extension;

/// Display name of the signed-in user, if any, for the page header.
pub(crate) fn user_name(auth: Option<Extension<AuthState>>) -> Option<String> {
    auth.and_then(|Extension(state)| state.user().map(|user| user.display_name().to_string()))
}
