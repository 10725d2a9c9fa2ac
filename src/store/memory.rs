//! # In-Memory Store
//!
//! Documents are fetched in ascending id order, so audits over an unchanged
//! store are repeatable. Fetch and update failures can be injected.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use serde_json::Value;

use crate::document::{fields_from_json, Document, DocumentPath, FieldMap};

use super::errors::{StoreError, StoreResult};
use super::DocumentStore;

/// Collection path to (document id to fields)
pub type CollectionMap = BTreeMap<String, BTreeMap<String, FieldMap>>;

#[derive(Debug, Default)]
struct Faults {
    fetch: HashSet<String>,
    update: HashSet<DocumentPath>,
    all_updates: bool,
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<CollectionMap>,
    faults: RwLock<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given collections
    pub fn from_collections(collections: CollectionMap) -> Self {
        Self {
            collections: RwLock::new(collections),
            faults: RwLock::new(Faults::default()),
        }
    }

    /// Inserts or replaces a document.
    pub fn insert(&self, collection: &str, id: &str, fields: FieldMap) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    /// Inserts a document given as a JSON object.
    pub fn insert_json(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        match data {
            Value::Object(obj) => self.insert(collection, id, fields_from_json(obj)),
            other => Err(StoreError::Malformed(format!(
                "document {}/{} must be an object, got {}",
                collection, id, other
            ))),
        }
    }

    /// Reads a document back.
    pub fn get(&self, path: &DocumentPath) -> StoreResult<Option<FieldMap>> {
        let collections = self.collections.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    /// Copy of every collection
    pub fn snapshot(&self) -> StoreResult<CollectionMap> {
        let collections = self.collections.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections.clone())
    }

    /// Makes every fetch of `collection` fail.
    pub fn fail_fetch(&self, collection: &str) -> StoreResult<()> {
        let mut faults = self.faults.write().map_err(|_| StoreError::LockPoisoned)?;
        faults.fetch.insert(collection.to_string());
        Ok(())
    }

    /// Makes updates of one document fail.
    pub fn fail_update(&self, path: DocumentPath) -> StoreResult<()> {
        let mut faults = self.faults.write().map_err(|_| StoreError::LockPoisoned)?;
        faults.update.insert(path);
        Ok(())
    }

    /// Makes every update fail.
    pub fn fail_all_updates(&self) -> StoreResult<()> {
        let mut faults = self.faults.write().map_err(|_| StoreError::LockPoisoned)?;
        faults.all_updates = true;
        Ok(())
    }

    pub(crate) fn fetch_now(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        {
            let faults = self.faults.read().map_err(|_| StoreError::LockPoisoned)?;
            if faults.fetch.contains(collection) {
                return Err(StoreError::Unavailable {
                    collection: collection.to_string(),
                    reason: "injected fetch failure".into(),
                });
            }
        }

        let collections = self.collections.read().map_err(|_| StoreError::LockPoisoned)?;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(id, fields)| Document::new(DocumentPath::new(collection, id), fields.clone()))
            .collect())
    }

    pub(crate) fn update_now(&self, path: &DocumentPath, update: &FieldMap) -> StoreResult<()> {
        {
            let faults = self.faults.read().map_err(|_| StoreError::LockPoisoned)?;
            if faults.all_updates || faults.update.contains(path) {
                return Err(StoreError::UpdateRejected {
                    document: path.to_string(),
                    reason: "injected update failure".into(),
                });
            }
        }

        let mut collections = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        let fields = collections
            .get_mut(path.collection())
            .and_then(|docs| docs.get_mut(path.id()))
            .ok_or_else(|| StoreError::DocumentNotFound(path.to_string()))?;

        for (name, value) in update {
            fields.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    async fn fetch_documents(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        self.fetch_now(collection, limit)
    }

    async fn update_document(&self, path: &DocumentPath, update: &FieldMap) -> StoreResult<()> {
        self.update_now(path, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldValue;
    use serde_json::json;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store.insert_json("bars", id, json!({"name": id})).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_fetch_is_ordered_and_limited() {
        let store = seeded();

        let all = store.fetch_documents("bars", None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let two = store.fetch_documents("bars", Some(2)).await.unwrap();
        assert_eq!(two.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = seeded();
        assert!(store.fetch_documents("users", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = seeded();
        let path = DocumentPath::new("bars", "a");
        let mut update = FieldMap::new();
        update.insert("city".into(), FieldValue::from("Recife"));

        store.update_document(&path, &update).await.unwrap();

        let fields = store.get(&path).unwrap().unwrap();
        assert_eq!(fields.get("name"), Some(&FieldValue::from("a")));
        assert_eq!(fields.get("city"), Some(&FieldValue::from("Recife")));
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = seeded();
        let result = store
            .update_document(&DocumentPath::new("bars", "zzz"), &FieldMap::new())
            .await;
        assert!(matches!(result, Err(StoreError::DocumentNotFound(_))));
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let store = seeded();
        store.fail_fetch("bars").unwrap();
        assert!(matches!(
            store.fetch_documents("bars", None).await,
            Err(StoreError::Unavailable { .. })
        ));

        let path = DocumentPath::new("bars", "a");
        store.fail_update(path.clone()).unwrap();
        assert!(store.update_document(&path, &FieldMap::new()).await.is_err());
        assert!(store
            .update_document(&DocumentPath::new("bars", "b"), &FieldMap::new())
            .await
            .is_ok());
    }

    #[test]
    fn test_insert_json_rejects_non_objects() {
        let store = MemoryStore::new();
        assert!(store.insert_json("bars", "x", json!([1, 2])).is_err());
    }
}
