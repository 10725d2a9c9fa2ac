//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    // ==================
    // Configuration
    // ==================
    /// Store configuration missing or unusable
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    // ==================
    // Reads
    // ==================
    /// Collection could not be fetched
    #[error("Collection '{collection}' unavailable: {reason}")]
    Unavailable { collection: String, reason: String },

    // ==================
    // Writes
    // ==================
    /// Update targeted a document that does not exist
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Update was refused by the store
    #[error("Update of '{document}' rejected: {reason}")]
    UpdateRejected { document: String, reason: String },

    // ==================
    // Backend
    // ==================
    #[error("Malformed store data: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// True for errors raised before any document was read
    pub fn is_config(&self) -> bool {
        matches!(self, StoreError::InvalidConfig(_) | StoreError::Malformed(_))
    }
}
