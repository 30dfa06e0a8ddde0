use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub firestore: FirestoreConfig,
    #[serde(default)]
    pub fcm: FcmConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted CloudEvent body size
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_database")]
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    /// "rest" (default) or "memory"
    #[serde(default = "default_firestore_backend")]
    pub backend: String,
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
    #[serde(default = "default_trigger_collection")]
    pub trigger_collection: String,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    #[serde(default = "default_fcm_url")]
    pub base_url: String,
    /// Ask FCM to validate the message without delivering it
    #[serde(default)]
    pub validate_only: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// "metadata" (default), "service_account" or "static"
    #[serde(default = "default_auth_mode")]
    pub mode: String,
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    /// Path to a service account JSON key (mode = "service_account")
    pub credentials_path: Option<String>,
    /// Bearer token used verbatim (mode = "static")
    pub static_token: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Per-request limit for token endpoint calls
    #[serde(default = "default_token_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_trigger_type")]
    pub trigger_type: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_click_action")]
    pub click_action: String,
    #[serde(default = "default_android_channel")]
    pub android_channel_id: String,
    /// Offset used to render event times when the profile carries none
    #[serde(default)]
    pub default_utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// One JSON object per line, for Cloud Logging
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    256 * 1024
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_firestore_backend() -> String {
    "rest".to_string()
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_trigger_collection() -> String {
    "notifications_trigger".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_fcm_url() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_auth_mode() -> String {
    "metadata".to_string()
}

fn default_metadata_url() -> String {
    "http://metadata.google.internal".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/datastore".to_string(),
        "https://www.googleapis.com/auth/firebase.messaging".to_string(),
    ]
}

fn default_token_timeout_seconds() -> u64 {
    10
}

fn default_trigger_type() -> String {
    "fingerprint_auth".to_string()
}

fn default_title() -> String {
    "Fingerprint Authentication".to_string()
}

fn default_click_action() -> String {
    "FLUTTER_NOTIFICATION_CLICK".to_string()
}

fn default_android_channel() -> String {
    "fingerprint_auth_channel".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "ara-fingerprint-relay".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // The Firestore emulator accepts the fixed "owner" bearer token
        let emulator_url = env::var("FIRESTORE_EMULATOR_HOST")
            .ok()
            .map(|host| format!("http://{}/v1", host));
        let emulator_auth = emulator_url.as_ref().map(|_| "static");
        let emulator_token = emulator_url.as_ref().map(|_| "owner");

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default(
                "firebase.project_id",
                env::var("GOOGLE_CLOUD_PROJECT").unwrap_or_default(),
            )?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // RELAY__SERVER__PORT, RELAY__FCM__VALIDATE_ONLY, RELAY__AUTH__SCOPES=a,b ...
            .add_source(
                Environment::with_prefix("RELAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.scopes"),
            )
            // Platform-provided variables win over everything else
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("firestore.base_url", emulator_url)?
            .set_override_option("auth.mode", emulator_auth)?
            .set_override_option("auth.static_token", emulator_token)?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database: default_database(),
        }
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            backend: default_firestore_backend(),
            base_url: default_firestore_url(),
            trigger_collection: default_trigger_collection(),
            users_collection: default_users_collection(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            base_url: default_fcm_url(),
            validate_only: false,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: default_auth_mode(),
            metadata_url: default_metadata_url(),
            credentials_path: None,
            static_token: None,
            scopes: default_scopes(),
            timeout_seconds: default_token_timeout_seconds(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            trigger_type: default_trigger_type(),
            title: default_title(),
            click_action: default_click_action(),
            android_channel_id: default_android_channel(),
            default_utc_offset_minutes: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_notification_defaults_match_client_contract() {
        let notification = NotificationConfig::default();
        assert_eq!(notification.trigger_type, "fingerprint_auth");
        assert_eq!(notification.title, "Fingerprint Authentication");
        assert_eq!(notification.click_action, "FLUTTER_NOTIFICATION_CLICK");
        assert_eq!(notification.android_channel_id, "fingerprint_auth_channel");
    }

    #[test]
    fn test_collection_defaults() {
        let firestore = FirestoreConfig::default();
        assert_eq!(firestore.trigger_collection, "notifications_trigger");
        assert_eq!(firestore.users_collection, "users");
        assert_eq!(FirebaseConfig::default().database, "(default)");
    }

    #[test]
    fn test_settings_deserialize_with_sparse_input() {
        let settings: Settings = Config::builder()
            .set_override("firebase.project_id", "demo-project")
            .unwrap()
            .set_override("auth.mode", "static")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.firebase.project_id, "demo-project");
        assert_eq!(settings.auth.mode, "static");
        assert_eq!(settings.auth.scopes.len(), 2);
        assert_eq!(settings.auth.timeout_seconds, 10);
        assert!(!settings.fcm.validate_only);
        assert_eq!(settings.server_addr(), "0.0.0.0:8080");
    }
}
