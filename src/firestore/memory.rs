use async_trait::async_trait;
use dashmap::DashMap;

use super::{Document, DocumentPath, DocumentStore, StoreError};

/// In-memory document store.
///
/// Documents are keyed by their relative path. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<DocumentPath, Document>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document
    pub fn insert(&self, path: DocumentPath, document: Document) {
        self.documents.insert(path, document);
    }

    pub fn contains(&self, path: &DocumentPath) -> bool {
        self.documents.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.get(path).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        if self.documents.remove(path).is_none() {
            tracing::debug!(path = %path, "Delete of missing document ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_delete() {
        let store = MemoryDocumentStore::new();
        let path = DocumentPath::new("users", "U1");
        store.insert(path.clone(), Document::new("users/U1").with_string("fcmToken", "tok"));

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.string_field("fcmToken"), Some("tok"));

        store.delete(&path).await.unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryDocumentStore::new();
        let path = DocumentPath::new("notifications_trigger", "gone");
        tokio_test::assert_ok!(store.delete(&path).await);
        tokio_test::assert_ok!(store.delete(&path).await);
    }
}
