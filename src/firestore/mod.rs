//! Document store access.
//!
//! The relay reads recipient profiles and deletes trigger documents through the
//! `DocumentStore` trait:
//!
//! - `FirestoreClient`: Firestore REST API (default)
//! - `MemoryDocumentStore`: in-process storage using DashMap (local runs, tests)

mod document;
mod factory;
mod memory;
mod rest;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::AuthError;

pub use document::{ArrayValue, Document, DocumentPath, FirestoreValue, GeoPoint, MapValue};
pub use factory::create_document_store;
pub use memory::MemoryDocumentStore;
pub use rest::FirestoreClient;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network-level failure talking to Firestore
    #[error("Firestore request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Firestore answered with a non-success status
    #[error("Firestore returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    /// Whether retrying the same operation later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Api { status, code, .. } => {
                *status == 429
                    || *status >= 500
                    || matches!(code.as_str(), "UNAVAILABLE" | "ABORTED" | "DEADLINE_EXCEEDED")
            }
            StoreError::Auth(e) => e.is_transient(),
            StoreError::InvalidPath(_) => false,
        }
    }
}

/// Read/delete access to documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend type identifier (for logs and health output)
    fn backend_type(&self) -> &'static str;

    /// Fetch a document; `Ok(None)` when it does not exist
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    /// Delete a document. Deleting a document that does not exist succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let unavailable = StoreError::Api {
            status: 503,
            code: "UNAVAILABLE".to_string(),
            message: String::new(),
        };
        let denied = StoreError::Api {
            status: 403,
            code: "PERMISSION_DENIED".to_string(),
            message: String::new(),
        };
        assert!(unavailable.is_transient());
        assert!(!denied.is_transient());
        assert!(!StoreError::InvalidPath("a/b/c".into()).is_transient());
    }
}
