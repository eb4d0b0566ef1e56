use crate::error::{Result, StoreError};
use crate::types::Document;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Document database the importer writes to.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Adds a document under a generated id and returns that id.
    async fn add(&self, collection: &str, document: &Document) -> std::result::Result<String, StoreError>;

    /// Creates or overwrites the document with the given id.
    async fn set(&self, collection: &str, id: &str, document: &Document) -> std::result::Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

/// In-memory store for tests and dry runs.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    collections: Arc<Mutex<HashMap<String, Vec<StoredDocument>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents of a collection in write order.
    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        let collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        collections.get(collection).cloned().unwrap_or_default()
    }

    /// Writes a collection to `<output_dir>/<collection>_<timestamp>.json` and returns the path.
    pub fn dump_to_json(&self, collection: &str, output_dir: &Path) -> Result<String> {
        fs::create_dir_all(output_dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filepath = output_dir.join(format!("{collection}_{timestamp}.json"));

        let json_content = serde_json::to_string_pretty(&self.documents(collection))?;
        fs::write(&filepath, json_content)?;

        Ok(filepath.to_string_lossy().to_string())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn add(&self, collection: &str, document: &Document) -> std::result::Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields: document.clone(),
            });

        debug!("Added document {} to {}", id, collection);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, document: &Document) -> std::result::Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        let docs = collections.entry(collection.to_string()).or_default();
        let stored = StoredDocument {
            id: id.to_string(),
            fields: document.clone(),
        };
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => *existing = stored,
            None => docs.push(stored),
        }

        debug!("Set document {} in {}", id, collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    fn doc(name: &str) -> Document {
        Document::from([("nome".to_string(), FieldValue::from(name))])
    }

    #[tokio::test]
    async fn add_generates_distinct_ids() {
        let store = InMemoryStore::new();
        let a = store.add("projetos", &doc("A")).await.unwrap();
        let b = store.add("projetos", &doc("B")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.documents("projetos").len(), 2);
        assert!(store.documents("outra").is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_by_id() {
        let store = InMemoryStore::new();
        store.set("dadosEstados", "acre", &doc("old")).await.unwrap();
        store.set("dadosEstados", "acre", &doc("new")).await.unwrap();
        let docs = store.documents("dadosEstados");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["nome"], FieldValue::from("new"));
    }

    #[tokio::test]
    async fn dump_writes_collection_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryStore::new();
        store.add("projetos", &doc("Coral")).await.unwrap();

        let path = store.dump_to_json("projetos", dir.path()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("Coral"));
    }
}
