//! OAuth2 access tokens for Google APIs.
//!
//! Firestore and FCM calls carry a bearer token obtained from one of:
//! - `MetadataTokenProvider`: the GCE / Cloud Run metadata server (default)
//! - `ServiceAccountTokenProvider`: a JSON key, exchanged via a signed JWT assertion
//! - `StaticTokenProvider`: a fixed token (emulators, local testing)
//!
//! Use `create_token_provider()` to pick one from configuration.

mod cache;
mod claims;
mod jwt;
mod metadata;
mod service_account;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::config::AuthConfig;

pub use claims::AssertionClaims;
pub use jwt::AssertionSigner;
pub use metadata::MetadataTokenProvider;
pub use service_account::{ServiceAccountKey, ServiceAccountTokenProvider};

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Token endpoint request limit unless configured otherwise
const DEFAULT_TOKEN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Errors raised while obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to read credentials file: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Transport(_) => true,
            AuthError::Endpoint { status, .. } => *status == 429 || *status >= 500,
            AuthError::Credentials(_) | AuthError::Signing(_) | AuthError::Io(_) => false,
        }
    }
}

/// A bearer token and its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    /// `None` means the token never expires (static tokens)
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in_seconds: i64) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in_seconds)),
        }
    }

    pub fn non_expiring(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(REFRESH_MARGIN_SECONDS) >= expires_at,
            None => false,
        }
    }
}

/// OAuth2 token endpoint response (shared by the metadata server and oauth2.googleapis.com)
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl From<TokenResponse> for AccessToken {
    fn from(response: TokenResponse) -> Self {
        AccessToken::new(response.access_token, response.expires_in)
    }
}

/// Source of bearer tokens for outgoing Google API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Provider type identifier (for logs and health output)
    fn provider_type(&self) -> &'static str;

    /// Return a token that is valid for at least the refresh margin
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// Fixed bearer token.
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::non_expiring(token),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    fn provider_type(&self) -> &'static str {
        "static"
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.token.token.clone())
    }
}

/// Create an access token provider based on configuration.
///
/// - `"static"`: requires `auth.static_token`
/// - `"service_account"`: reads `auth.credentials_path`, falling back to
///   `GOOGLE_APPLICATION_CREDENTIALS`
/// - `"metadata"` (default): the instance metadata server
pub fn create_token_provider(
    config: &AuthConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn AccessTokenProvider>, AuthError> {
    match config.mode.as_str() {
        "static" => {
            let token = config
                .static_token
                .clone()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    AuthError::Credentials("auth.static_token is required in static mode".into())
                })?;
            tracing::info!(provider = "static", "Creating static token provider");
            Ok(Arc::new(StaticTokenProvider::new(token)))
        }
        "service_account" => {
            let path = config
                .credentials_path
                .clone()
                .or_else(|| std::env::var("GOOGLE_APPLICATION_CREDENTIALS").ok())
                .ok_or_else(|| {
                    AuthError::Credentials(
                        "auth.credentials_path or GOOGLE_APPLICATION_CREDENTIALS is required"
                            .into(),
                    )
                })?;
            let key = ServiceAccountKey::from_file(&path)?;
            tracing::info!(
                provider = "service_account",
                client_email = %key.client_email,
                "Creating service account token provider"
            );
            Ok(Arc::new(
                ServiceAccountTokenProvider::new(key, config.scopes.clone(), http)?
                    .with_timeout(std::time::Duration::from_secs(config.timeout_seconds)),
            ))
        }
        other => {
            if other != "metadata" {
                tracing::warn!(
                    mode = %other,
                    "Unknown auth mode, falling back to metadata server"
                );
            }
            tracing::info!(provider = "metadata", url = %config.metadata_url, "Creating metadata token provider");
            Ok(Arc::new(
                MetadataTokenProvider::new(config.metadata_url.clone(), config.scopes.clone(), http)
                    .with_timeout(std::time::Duration::from_secs(config.timeout_seconds)),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_returns_token() {
        let provider = StaticTokenProvider::new("owner");
        assert_eq!(provider.access_token().await.unwrap(), "owner");
        assert_eq!(provider.provider_type(), "static");
    }

    #[test]
    fn test_token_refresh_margin() {
        assert!(!AccessToken::new("t", 3600).needs_refresh());
        assert!(AccessToken::new("t", 30).needs_refresh());
        assert!(!AccessToken::non_expiring("t").needs_refresh());
    }

    #[test]
    fn test_static_mode_requires_token() {
        let config = AuthConfig {
            mode: "static".to_string(),
            ..AuthConfig::default()
        };
        let result = create_token_provider(&config, reqwest::Client::new());
        assert!(matches!(result, Err(AuthError::Credentials(_))));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_metadata() {
        let config = AuthConfig {
            mode: "kerberos".to_string(),
            ..AuthConfig::default()
        };
        let provider = create_token_provider(&config, reqwest::Client::new()).unwrap();
        assert_eq!(provider.provider_type(), "metadata");
    }

    #[test]
    fn test_transient_classification() {
        let server_error = AuthError::Endpoint {
            status: 503,
            body: String::new(),
        };
        let bad_request = AuthError::Endpoint {
            status: 400,
            body: String::new(),
        };
        assert!(server_error.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!AuthError::Credentials("missing".into()).is_transient());
    }
}
