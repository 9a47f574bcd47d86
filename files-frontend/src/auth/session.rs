use crate::auth::AuthState;
use crate::models::SignedInUser;
use crate::router::{Location, LOGIN_PATH, REDIRECT_QUERY_KEY};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use service_core::error::AppError;
use tower_sessions::Session;

const USER_KEY: &str = "user";

/// Reads and writes the signed-in user of a browser session.
pub struct AuthSession;

impl AuthSession {
    /// Current state of `session`. A missing or unreadable entry counts as
    /// signed out.
    pub async fn load(session: &Session) -> AuthState {
        match session.get::<SignedInUser>(USER_KEY).await {
            Ok(Some(user)) => AuthState::SignedIn(user),
            Ok(None) => AuthState::SignedOut,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session, treating as signed out");
                AuthState::SignedOut
            }
        }
    }

    /// Record `user` as signed in. The session id is rotated first so a
    /// pre-login id cannot be reused.
    pub async fn sign_in(session: &Session, user: &SignedInUser) -> Result<(), AppError> {
        session
            .cycle_id()
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session rotate: {}", e)))?;
        session
            .insert(USER_KEY, user)
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write: {}", e)))?;
        Ok(())
    }

    pub async fn sign_out(session: &Session) -> Result<(), AppError> {
        session
            .flush()
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session flush: {}", e)))
    }
}

/// The signed-in user of the current request.
///
/// Reads the [`AuthState`] the navigation guard attached to the request.
/// Without one, the request is sent to the login page like any other
/// unauthenticated navigation.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SignedInUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthState>() {
            Some(AuthState::SignedIn(user)) => Ok(CurrentUser(user.clone())),
            _ => {
                let login = Location::new(LOGIN_PATH)
                    .with_query(REDIRECT_QUERY_KEY, Location::from(&parts.uri).full_path());
                Err(Redirect::to(&login.full_path()).into_response())
            }
        }
    }
}
