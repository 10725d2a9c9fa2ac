//! # JSON Export Store
//!
//! Reads a store export of the form
//!
//! ```json
//! {
//!   "bars": {
//!     "b1": {
//!       "name": "Boteco",
//!       "__collections__": { "events": { "e1": { "title": "Samba" } } }
//!     }
//!   }
//! }
//! ```
//!
//! and serves it from memory. Each applied update rewrites the whole export
//! file (temp file, then rename) before the update is acknowledged, so a run
//! fixing N documents writes the export N times. Exports are expected to be
//! small enough for that.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::document::{fields_from_json, Document, DocumentPath, FieldMap};

use super::errors::{StoreError, StoreResult};
use super::memory::{CollectionMap, MemoryStore};
use super::DocumentStore;

const SUBCOLLECTIONS_KEY: &str = "__collections__";

/// Document store backed by a JSON export file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Opens an export file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let content = fs::read_to_string(&path).map_err(|e| {
            StoreError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let root: Value = serde_json::from_str(&content).map_err(|e| {
            StoreError::Malformed(format!("{}: invalid JSON: {}", path.display(), e))
        })?;

        let mut collections = CollectionMap::new();
        match root {
            Value::Object(obj) => load_collections("", obj, &mut collections)?,
            _ => {
                return Err(StoreError::Malformed(format!(
                    "{}: export root must be an object",
                    path.display()
                )))
            }
        }

        Ok(Self {
            path,
            inner: MemoryStore::from_collections(collections),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a document back.
    pub fn get(&self, path: &DocumentPath) -> StoreResult<Option<FieldMap>> {
        self.inner.get(path)
    }

    async fn persist(&self) -> StoreResult<()> {
        let export = to_export(&self.inner.snapshot()?);
        let content = serde_json::to_string_pretty(&export)
            .map_err(|e| StoreError::IoError(format!("Failed to serialize export: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::IoError(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::IoError(format!("Failed to replace {}: {}", self.path.display(), e)))
    }
}

impl DocumentStore for FileStore {
    async fn fetch_documents(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        self.inner.fetch_now(collection, limit)
    }

    /// Applies the update in memory, then persists it. If persisting fails
    /// the document's previous fields are restored, so a failed update never
    /// reaches disk with a later write.
    async fn update_document(&self, path: &DocumentPath, update: &FieldMap) -> StoreResult<()> {
        let previous = self
            .inner
            .get(path)?
            .ok_or_else(|| StoreError::DocumentNotFound(path.to_string()))?;

        self.inner.update_now(path, update)?;
        if let Err(e) = self.persist().await {
            self.inner.insert(path.collection(), path.id(), previous)?;
            return Err(e);
        }
        Ok(())
    }
}

fn load_collections(
    prefix: &str,
    collections: Map<String, Value>,
    out: &mut CollectionMap,
) -> StoreResult<()> {
    for (name, docs) in collections {
        let collection_path = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };

        let Value::Object(docs) = docs else {
            return Err(StoreError::Malformed(format!(
                "collection '{}' must be an object of documents",
                collection_path
            )));
        };

        let entry = out.entry(collection_path.clone()).or_default();
        let mut nested = Vec::new();

        for (id, data) in docs {
            let Value::Object(mut data) = data else {
                return Err(StoreError::Malformed(format!(
                    "document '{}/{}' must be an object",
                    collection_path, id
                )));
            };
            if let Some(subcollections) = data.remove(SUBCOLLECTIONS_KEY) {
                nested.push((format!("{}/{}", collection_path, id), subcollections));
            }
            entry.insert(id, fields_from_json(data));
        }

        for (doc_path, subcollections) in nested {
            match subcollections {
                Value::Object(obj) => load_collections(&doc_path, obj, out)?,
                _ => {
                    return Err(StoreError::Malformed(format!(
                        "'{}' of '{}' must be an object",
                        SUBCOLLECTIONS_KEY, doc_path
                    )))
                }
            }
        }
    }
    Ok(())
}

/// Rebuilds the nested export shape from flat collection paths.
fn to_export(collections: &CollectionMap) -> Value {
    let mut root = Map::new();

    for (collection_path, docs) in collections {
        let segments: Vec<&str> = collection_path.split('/').collect();
        let target = descend(&mut root, &segments);
        for (id, fields) in docs {
            let doc = target
                .entry(id.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(doc) = doc {
                for (name, value) in fields {
                    doc.insert(name.clone(), value.to_json());
                }
            }
        }
    }

    Value::Object(root)
}

/// Walks `collection/doc/collection/...` down to the documents map of the
/// last collection, creating intermediate entries.
fn descend<'a>(root: &'a mut Map<String, Value>, segments: &[&str]) -> &'a mut Map<String, Value> {
    let mut current = root;
    let mut rest = segments;

    while let [collection, tail @ ..] = rest {
        let docs = child_object(current, collection);
        let [doc_id, tail @ ..] = tail else {
            return docs;
        };
        let doc = child_object(docs, doc_id);
        current = child_object(doc, SUBCOLLECTIONS_KEY);
        rest = tail;
    }
    current
}

fn child_object<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(obj) => obj,
        _ => unreachable!("slot holds an object"),
    }
}
