//! # Audit Errors
//!
//! Violations found in documents are not errors. These are the failures
//! that abort a run.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;

/// Fatal audit errors
#[derive(Debug, Clone, Error)]
pub enum AuditError {
    /// A collection or subcollection could not be fetched
    #[error("Failed to audit collection '{collection}': {source}")]
    Fetch {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// The report could not be persisted
    #[error("Failed to write report {path}: {reason}")]
    ReportWrite { path: String, reason: String },
}

impl AuditError {
    pub fn fetch(collection: impl Into<String>, source: StoreError) -> Self {
        AuditError::Fetch {
            collection: collection.into(),
            source,
        }
    }
}
