use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use crate::auth::AccessTokenProvider;
use crate::config::{FirebaseConfig, FirestoreConfig};
use crate::error::GoogleApiError;

use super::{Document, DocumentPath, DocumentStore, StoreError};

/// Firestore REST API client (`/v1/projects/{p}/databases/{d}/documents/...`).
pub struct FirestoreClient {
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    documents_root: Url,
    timeout: Duration,
}

impl FirestoreClient {
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
        firebase: &FirebaseConfig,
        config: &FirestoreConfig,
    ) -> Result<Self, StoreError> {
        let mut documents_root = Url::parse(&config.base_url).map_err(|e| {
            StoreError::InvalidPath(format!("bad base url {}: {}", config.base_url, e))
        })?;
        documents_root
            .path_segments_mut()
            .map_err(|_| StoreError::InvalidPath(format!("bad base url {}", config.base_url)))?
            .pop_if_empty()
            .extend([
                "projects",
                firebase.project_id.as_str(),
                "databases",
                firebase.database.as_str(),
                "documents",
            ]);

        Ok(Self {
            http,
            tokens,
            documents_root,
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    fn document_url(&self, path: &DocumentPath) -> Result<Url, StoreError> {
        let mut url = self.documents_root.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidPath(path.to_string()))?
            .extend([path.collection.as_str(), path.id.as_str()]);
        Ok(url)
    }

    async fn api_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let api = GoogleApiError::from_body(status, &body);
        StoreError::Api {
            status,
            code: api.best_code().to_string(),
            message: api.message,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    fn backend_type(&self) -> &'static str {
        "firestore"
    }

    #[tracing::instrument(name = "firestore.get", skip(self), fields(path = %path))]
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json::<Document>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::api_error(response).await),
        }
    }

    #[tracing::instrument(name = "firestore.delete", skip(self), fields(path = %path))]
    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        let url = self.document_url(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .delete(url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                tracing::debug!("Document already deleted");
                Ok(())
            }
            _ => Err(Self::api_error(response).await),
        }
    }
}
