//! Document store factory

use std::sync::Arc;

use crate::auth::AccessTokenProvider;
use crate::config::{FirebaseConfig, FirestoreConfig};

use super::{DocumentStore, FirestoreClient, MemoryDocumentStore, StoreError};

/// Create a document store based on `firestore.backend`:
/// - `"memory"`: an empty `MemoryDocumentStore`
/// - `"rest"` (default): a `FirestoreClient`
pub fn create_document_store(
    firebase: &FirebaseConfig,
    config: &FirestoreConfig,
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.backend.as_str() {
        "memory" => {
            tracing::warn!(
                backend = "memory",
                "Creating in-memory document store, profiles will not persist"
            );
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        other => {
            if other != "rest" {
                tracing::warn!(
                    backend = %other,
                    "Unknown document store backend, falling back to rest"
                );
            }
            tracing::info!(
                backend = "rest",
                base_url = %config.base_url,
                project_id = %firebase.project_id,
                database = %firebase.database,
                "Creating Firestore REST document store"
            );
            Ok(Arc::new(FirestoreClient::new(http, tokens, firebase, config)?))
        }
    }
}
