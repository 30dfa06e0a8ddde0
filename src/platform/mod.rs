//! Outbound platform clients.
//!
//! One shared HTTP client and token provider back both the document store
//! and the push gateway.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{create_token_provider, AccessTokenProvider, AuthError};
use crate::config::Settings;
use crate::firestore::{create_document_store, DocumentStore, StoreError};
use crate::push::{FcmClient, PushGateway};
use crate::relay::NotificationRelayHandler;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to initialize credentials: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to initialize document store: {0}")]
    Store(#[from] StoreError),
}

/// Handles to the platform services the relay talks to.
#[derive(Clone)]
pub struct Platform {
    pub tokens: Arc<dyn AccessTokenProvider>,
    pub store: Arc<dyn DocumentStore>,
    pub push: Arc<dyn PushGateway>,
}

impl Platform {
    pub fn init(settings: &Settings) -> Result<Self, PlatformError> {
        let project_id = settings.firebase.project_id.as_str();
        if project_id.is_empty() {
            return Err(PlatformError::MissingConfig(
                "firebase.project_id (or GOOGLE_CLOUD_PROJECT)",
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let tokens = create_token_provider(&settings.auth, http.clone())?;
        let store = create_document_store(
            &settings.firebase,
            &settings.firestore,
            http.clone(),
            tokens.clone(),
        )?;
        let push: Arc<dyn PushGateway> =
            Arc::new(FcmClient::new(http, tokens.clone(), &settings.fcm, project_id));

        tracing::info!(
            project_id = %project_id,
            token_provider = tokens.provider_type(),
            store = store.backend_type(),
            push = push.gateway_type(),
            validate_only = settings.fcm.validate_only,
            "Platform clients initialized"
        );

        Ok(Self {
            tokens,
            store,
            push,
        })
    }

    pub fn relay_handler(&self, settings: &Settings) -> NotificationRelayHandler {
        NotificationRelayHandler::new(
            self.store.clone(),
            self.push.clone(),
            &settings.notification,
            settings.firestore.users_collection.clone(),
        )
    }
}
