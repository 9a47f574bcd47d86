//! Shared setup for files-frontend integration tests.
//!
//! The hosted identity, storage and database services are all stood in for by
//! one wiremock server.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use files_frontend::backend::BackendProject;
use files_frontend::config::{BackendSettings, ServerSettings};
use files_frontend::startup::build_router;
use files_frontend::AppState;
use secrecy::Secret;
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const PROJECT_ID: &str = "universalfiles-test";
pub const BUCKET: &str = "universalfiles-test.appspot.com";
pub const UID: &str = "user-123";
pub const ID_TOKEN: &str = "id-token-abc";

pub fn backend_settings(endpoint: &str) -> BackendSettings {
    BackendSettings {
        api_key: Secret::new(API_KEY.to_string()),
        auth_domain: format!("{}.firebaseapp.com", PROJECT_ID),
        project_id: PROJECT_ID.to_string(),
        storage_bucket: BUCKET.to_string(),
        messaging_sender_id: "1234567890".to_string(),
        app_id: "1:1234567890:web:abcdef".to_string(),
        identity_endpoint: endpoint.to_string(),
        storage_endpoint: endpoint.to_string(),
        database_endpoint: endpoint.to_string(),
    }
}

pub fn server_settings() -> ServerSettings {
    ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        secure_cookies: false,
        session_ttl_hours: 1,
    }
}

pub fn files_collection_path() -> String {
    format!(
        "/v1/projects/{}/databases/(default)/documents/users/{}/files",
        PROJECT_ID, UID
    )
}

pub fn objects_path() -> String {
    format!("/v0/b/{}/o", BUCKET)
}

pub struct TestApp {
    pub router: Router,
    pub backend: MockServer,
    pub project: Arc<BackendProject>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;
        let project = Arc::new(
            BackendProject::initialize(backend_settings(&backend.uri()))
                .expect("test settings are valid"),
        );
        let router = build_router(AppState::new(project.clone()), &server_settings());

        Self {
            router,
            backend,
            project,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = serde_urlencoded::to_string(form).unwrap();
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Answer sign-in attempts for `email` with a signed-in user.
    pub async fn mock_sign_in_success(&self, email: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "identitytoolkit#VerifyPasswordResponse",
                "localId": UID,
                "email": email,
                "displayName": "",
                "idToken": ID_TOKEN,
                "registered": true,
                "refreshToken": "refresh-token-xyz",
                "expiresIn": "3600"
            })))
            .mount(&self.backend)
            .await;
    }

    /// Sign in through the login form and return the session cookie.
    pub async fn sign_in(&self) -> String {
        self.mock_sign_in_success("ada@example.com").await;

        let response = self
            .post_form(
                "/login",
                &[("email", "ada@example.com"), ("password", "secret")],
                None,
            )
            .await;

        session_cookie(&response).expect("sign-in sets a session cookie")
    }
}

/// `name=value` part of the response's session cookie.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("id="))
        .and_then(|value| value.split(';').next())
        .map(|value| value.to_string())
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has a Location header")
        .to_str()
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
