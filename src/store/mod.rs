//! # Document Store
//!
//! The auditor reads and patches the store through two operations only:
//! fetch up to N documents of a collection path, and merge a partial update
//! into one document. Both are fallible async I/O.
//!
//! Collection paths are concrete: `bars` or `bars/b1/events`.

mod config;
mod errors;
mod file;
mod memory;

pub use config::StoreConfig;
pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::{CollectionMap, MemoryStore};

use std::future::Future;

use crate::document::{Document, DocumentPath, FieldMap};

/// Collection/document store consumed by the auditor
pub trait DocumentStore: Send + Sync {
    /// Fetches documents of a collection; `None` means no limit.
    fn fetch_documents(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    /// Sets the given fields on an existing document, leaving others as is.
    fn update_document(
        &self,
        path: &DocumentPath,
        update: &FieldMap,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Store selected by configuration
#[derive(Debug)]
pub enum Backend {
    Memory(MemoryStore),
    File(FileStore),
}

impl DocumentStore for Backend {
    async fn fetch_documents(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        match self {
            Backend::Memory(store) => store.fetch_documents(collection, limit).await,
            Backend::File(store) => store.fetch_documents(collection, limit).await,
        }
    }

    async fn update_document(&self, path: &DocumentPath, update: &FieldMap) -> StoreResult<()> {
        match self {
            Backend::Memory(store) => store.update_document(path, update).await,
            Backend::File(store) => store.update_document(path, update).await,
        }
    }
}
