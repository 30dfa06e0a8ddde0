use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::cache::TokenCache;
use super::{
    AccessToken, AccessTokenProvider, AssertionClaims, AssertionSigner, AuthError, TokenResponse,
    DEFAULT_TOKEN_TIMEOUT,
};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The fields of a service account JSON key that token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::Credentials(format!("malformed service account key: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Exchanges RS256-signed assertions for access tokens at the key's `token_uri`.
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    signer: AssertionSigner,
    scopes: Vec<String>,
    http: reqwest::Client,
    timeout: Duration,
    cache: TokenCache,
}

impl ServiceAccountTokenProvider {
    pub fn new(
        key: ServiceAccountKey,
        scopes: Vec<String>,
        http: reqwest::Client,
    ) -> Result<Self, AuthError> {
        let signer = AssertionSigner::new(&key.private_key, key.private_key_id.as_deref())?;
        Ok(Self {
            key,
            signer,
            scopes,
            http,
            timeout: DEFAULT_TOKEN_TIMEOUT,
            cache: TokenCache::new(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self) -> Result<AccessToken, AuthError> {
        let claims = AssertionClaims::new(&self.key.client_email, &self.scopes, &self.key.token_uri);
        let assertion = self.signer.sign(&claims)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .timeout(self.timeout)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                client_email = %self.key.client_email,
                "Service account token exchange rejected"
            );
            return Err(AuthError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    fn provider_type(&self) -> &'static str {
        "service_account"
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        self.cache.get_or_fetch(|| self.fetch()).await
    }
}
