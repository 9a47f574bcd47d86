use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config::{load_layered, service_config_dir, ObservabilityConfig};
use service_core::error::AppError;

pub const SERVICE_NAME: &str = "files-frontend";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Idle lifetime of a signed-in session.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

fn default_session_ttl_hours() -> i64 {
    24
}

/// Connection parameters of the hosted backend project.
#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    pub api_key: Secret<String>,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    #[serde(default = "default_identity_endpoint")]
    pub identity_endpoint: String,
    #[serde(default = "default_storage_endpoint")]
    pub storage_endpoint: String,
    #[serde(default = "default_database_endpoint")]
    pub database_endpoint: String,
}

fn default_identity_endpoint() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_storage_endpoint() -> String {
    "https://firebasestorage.googleapis.com".to_string()
}

fn default_database_endpoint() -> String {
    "https://firestore.googleapis.com".to_string()
}

impl BackendSettings {
    /// Reject settings the hosted SDKs would refuse at first use.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("api_key", self.api_key.expose_secret().as_str()),
            ("auth_domain", self.auth_domain.as_str()),
            ("project_id", self.project_id.as_str()),
            ("storage_bucket", self.storage_bucket.as_str()),
            ("app_id", self.app_id.as_str()),
        ];

        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "backend.{} must not be empty",
                name
            )));
        }

        for (name, endpoint) in [
            ("identity_endpoint", &self.identity_endpoint),
            ("storage_endpoint", &self.storage_endpoint),
            ("database_endpoint", &self.database_endpoint),
        ] {
            reqwest::Url::parse(endpoint).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "backend.{} is not a valid URL ({}): {}",
                    name,
                    endpoint,
                    e
                ))
            })?;
        }

        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let configuration_directory = service_config_dir(SERVICE_NAME)?;
    load_layered(&configuration_directory)
}
