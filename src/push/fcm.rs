use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::AccessTokenProvider;
use crate::config::FcmConfig;
use crate::error::GoogleApiError;

use super::message::{SendRequest, SendResponse};
use super::{PushError, PushGateway, PushMessage, SendReceipt};

/// FCM HTTP v1 client.
pub struct FcmClient {
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    endpoint: String,
    validate_only: bool,
    timeout: Duration,
}

impl FcmClient {
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
        config: &FcmConfig,
        project_id: &str,
    ) -> Self {
        let endpoint = format!(
            "{}/v1/projects/{}/messages:send",
            config.base_url.trim_end_matches('/'),
            project_id
        );
        Self {
            http,
            tokens,
            endpoint,
            validate_only: config.validate_only,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PushGateway for FcmClient {
    fn gateway_type(&self) -> &'static str {
        "fcm"
    }

    #[tracing::instrument(
        name = "fcm.send",
        skip(self, message),
        fields(validate_only = self.validate_only)
    )]
    async fn send(&self, message: &PushMessage) -> Result<SendReceipt, PushError> {
        let token = self.tokens.access_token().await?;
        let request = SendRequest {
            validate_only: self.validate_only,
            message,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let accepted: SendResponse = response.json().await?;
            return Ok(SendReceipt {
                message_id: accepted.name,
            });
        }

        let body = response.text().await.unwrap_or_default();
        let api = GoogleApiError::from_body(status.as_u16(), &body);
        Err(PushError::Rejected {
            status: status.as_u16(),
            code: api.best_code().to_string(),
            message: api.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::push::{AndroidConfig, ApnsConfig, Notification, PushErrorKind};
    use serde_json::json;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEND_PATH: &str = "/v1/projects/demo/messages:send";

    fn create_test_client(base_url: &str, validate_only: bool) -> FcmClient {
        let config = FcmConfig {
            base_url: base_url.to_string(),
            validate_only,
            ..FcmConfig::default()
        };
        FcmClient::new(
            reqwest::Client::new(),
            Arc::new(StaticTokenProvider::new("test-token")),
            &config,
            "demo",
        )
    }

    fn create_test_message() -> PushMessage {
        let mut data = BTreeMap::new();
        data.insert("taskId".to_string(), "T1".to_string());
        PushMessage {
            token: "tok-123".to_string(),
            notification: Some(Notification {
                title: "Fingerprint Authentication".to_string(),
                body: "Alice has authenticated".to_string(),
            }),
            data,
            android: Some(AndroidConfig::high_priority("fingerprint_auth_channel")),
            apns: Some(ApnsConfig::immediate_content_available()),
        }
    }

    #[test]
    fn test_endpoint_format() {
        let client = create_test_client("https://fcm.googleapis.com/", false);
        assert_eq!(
            client.endpoint(),
            "https://fcm.googleapis.com/v1/projects/demo/messages:send"
        );
    }

    #[tokio::test]
    async fn test_send_success_returns_message_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(json!({
                "message": {
                    "token": "tok-123",
                    "data": {"taskId": "T1"},
                    "android": {"priority": "HIGH"}
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "projects/demo/messages/0:1500415314455276%31bd1c9631bd1c96"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri(), false);
        let receipt = client.send(&create_test_message()).await.unwrap();
        assert_eq!(
            receipt.message_id,
            "projects/demo/messages/0:1500415314455276%31bd1c9631bd1c96"
        );
    }

    #[tokio::test]
    async fn test_validate_only_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({"validate_only": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"name": "projects/demo/messages/fake"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri(), true);
        assert!(client.send(&create_test_message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unregistered_token_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "code": 404,
                    "message": "Requested entity was not found.",
                    "status": "NOT_FOUND",
                    "details": [{
                        "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                        "errorCode": "UNREGISTERED"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri(), false);
        let err = client.send(&create_test_message()).await.unwrap_err();
        match &err {
            PushError::Rejected { status, code, .. } => {
                assert_eq!(*status, 404);
                assert_eq!(code, "UNREGISTERED");
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
        assert_eq!(err.kind(), PushErrorKind::Permanent);
    }

    #[tokio::test]
    async fn test_unavailable_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream connect error"))
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri(), false);
        let err = client.send(&create_test_message()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        // Nothing listens on the discard port
        let client = create_test_client("http://127.0.0.1:9", false);
        let err = client.send(&create_test_message()).await.unwrap_err();
        assert!(matches!(err, PushError::Transport(_)));
        assert!(err.is_transient());
    }
}
