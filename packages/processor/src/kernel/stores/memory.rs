//! In-memory document store for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::common::{ProcessorError, Result};
use crate::kernel::{BaseDocumentStore, Document};

type Key = (String, String);

/// In-memory documents keyed by (collection, id).
///
/// Not suitable for production as data is lost on restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<Key, Document>>,
}

fn key(collection: &str, id: &str) -> Key {
    (collection.to_string(), id.to_string())
}

fn poisoned<T>(_: PoisonError<T>) -> ProcessorError {
    ProcessorError::Persistence("memory store lock poisoned".into())
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document synchronously (test fixtures).
    pub fn insert(&self, collection: &str, id: &str, doc: Document) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(key(collection, id), doc);
        }
    }

    /// Snapshot of a stored document.
    pub fn snapshot(&self, collection: &str, id: &str) -> Option<Document> {
        self.documents
            .read()
            .ok()
            .and_then(|documents| documents.get(&key(collection, id)).cloned())
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.documents
            .read()
            .map(|documents| documents.keys().filter(|(c, _)| c == collection).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl BaseDocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.get(&key(collection, id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<()> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        documents.insert(key(collection, id), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<()> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let existing = documents
            .get_mut(&key(collection, id))
            .ok_or_else(|| ProcessorError::NotFound(format!("{}/{}", collection, id)))?;
        existing.extend(patch);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_documents() {
        let store = MemoryDocumentStore::new();
        assert!(store.get("posts", "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_the_whole_document() {
        let store = MemoryDocumentStore::new();
        store
            .set("posts", "p1", doc(json!({"a": 1, "b": 2})))
            .await
            .unwrap();
        store.set("posts", "p1", doc(json!({"c": 3}))).await.unwrap();

        let stored = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(serde_json::Value::Object(stored), json!({"c": 3}));
    }

    #[tokio::test]
    async fn update_merges_fields_shallowly() {
        let store = MemoryDocumentStore::new();
        store
            .set("posts", "p1", doc(json!({"status": "processing", "retry_count": 0})))
            .await
            .unwrap();
        store
            .update("posts", "p1", doc(json!({"status": "error", "error": "boom"})))
            .await
            .unwrap();

        let stored = store.snapshot("posts", "p1").unwrap();
        assert_eq!(
            serde_json::Value::Object(stored),
            json!({"status": "error", "retry_count": 0, "error": "boom"})
        );
    }

    #[tokio::test]
    async fn update_of_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update("posts", "nope", doc(json!({"status": "error"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::NotFound(_)));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        store.insert("posts", "p1", doc(json!({"x": 1})));
        store.insert("generated_posts", "p1", doc(json!({"y": 2})));

        assert_eq!(store.count("posts"), 1);
        assert_eq!(store.count("generated_posts"), 1);
        assert_eq!(store.count("source_posts"), 0);
    }
}
