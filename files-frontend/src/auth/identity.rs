use crate::backend::upstream_error;
use crate::config::BackendSettings;
use crate::models::SignedInUser;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the project's identity service.
pub struct IdentityClient {
    http: Client,
    settings: Arc<BackendSettings>,
}

impl IdentityClient {
    pub(crate) fn new(http: Client, settings: Arc<BackendSettings>) -> Self {
        Self { http, settings }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}",
            self.settings.identity_endpoint.trim_end_matches('/'),
            method
        )
    }

    /// Exchange email and password for a signed-in user.
    ///
    /// Rejected credentials come back as `AppError::Unauthorized`.
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedInUser, AppError> {
        let response = self
            .http
            .traced_post(&self.endpoint("signInWithPassword"))
            .query(&[("key", self.settings.api_key.expose_secret().as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Identity request failed");
                AppError::BadGateway(format!("identity service unreachable: {}", e))
            })?;

        if response.status() == StatusCode::BAD_REQUEST {
            let reason = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| "UNKNOWN".to_string());

            tracing::info!(%reason, "Sign-in rejected");
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "sign-in rejected: {}",
                reason
            )));
        }

        if !response.status().is_success() {
            return Err(upstream_error("identity", response).await);
        }

        let body: SignInResponse = response.json().await?;

        tracing::info!(uid = %body.local_id, "User signed in");

        Ok(SignedInUser {
            uid: body.local_id,
            email: body.email,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        })
    }
}
