//! Schema errors
//!
//! Every schema error is a configuration error: the run aborts before any
//! document is read.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema loading errors
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("Schema file not found: {0}")]
    NotFound(String),

    #[error("Failed to read schema {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Malformed schema {path}: {reason}")]
    Malformed { path: String, reason: String },
}

impl SchemaError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
