use std::time::Duration;

use async_trait::async_trait;

use super::cache::TokenCache;
use super::{AccessToken, AccessTokenProvider, AuthError, TokenResponse, DEFAULT_TOKEN_TIMEOUT};

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Fetches tokens for the instance's default service account from the metadata server.
pub struct MetadataTokenProvider {
    base_url: String,
    scopes: Vec<String>,
    http: reqwest::Client,
    timeout: Duration,
    cache: TokenCache,
}

impl MetadataTokenProvider {
    pub fn new(base_url: String, scopes: Vec<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            scopes,
            http,
            timeout: DEFAULT_TOKEN_TIMEOUT,
            cache: TokenCache::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self) -> Result<AccessToken, AuthError> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        let mut request = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .timeout(self.timeout);
        if !self.scopes.is_empty() {
            request = request.query(&[("scopes", self.scopes.join(","))]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
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
impl AccessTokenProvider for MetadataTokenProvider {
    fn provider_type(&self) -> &'static str {
        "metadata"
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        self.cache.get_or_fetch(|| self.fetch()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetches_and_caches_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .and(header("Metadata-Flavor", "Google"))
            .and(query_param("scopes", "scope-a,scope-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.metadata",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = MetadataTokenProvider::new(
            server.uri(),
            vec!["scope-a".to_string(), "scope-b".to_string()],
            reqwest::Client::new(),
        );

        assert_eq!(provider.access_token().await.unwrap(), "ya29.metadata");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.metadata");
    }

    #[tokio::test]
    async fn test_endpoint_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let provider = MetadataTokenProvider::new(server.uri(), vec![], reqwest::Client::new());

        match provider.access_token().await {
            Err(AuthError::Endpoint { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("Expected endpoint error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stalled_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "late", "expires_in": 3600}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let provider = MetadataTokenProvider::new(server.uri(), vec![], reqwest::Client::new())
            .with_timeout(Duration::from_millis(100));

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert!(err.is_transient());
    }
}
