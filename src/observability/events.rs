//! Observable events of an audit run
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events emitted while auditing a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    // Lifecycle
    /// Run begins
    AuditBegin,
    /// Schema file parsed and checked
    SchemaLoaded,
    /// Store backend opened
    StoreConnected,
    /// Run finished, report written
    AuditComplete,
    /// Run aborted (FATAL)
    AuditFailed,

    // Collections
    /// Collection traversal begins
    CollectionBegin,
    /// Collection traversal complete
    CollectionComplete,
    /// Collection path shape not supported
    CollectionSkipped,
    /// Schema names a custom rule nobody implements
    UnknownCustomRule,

    // Documents
    /// Document audited with violations
    DocumentInvalid,
    /// Default values written back to a document
    DocumentFixed,
    /// Writing defaults back failed
    DocumentFixFailed,

    // Report
    /// Report persisted
    ReportWritten,
}

impl AuditEvent {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::AuditBegin => "AUDIT_BEGIN",
            AuditEvent::SchemaLoaded => "SCHEMA_LOADED",
            AuditEvent::StoreConnected => "STORE_CONNECTED",
            AuditEvent::AuditComplete => "AUDIT_COMPLETE",
            AuditEvent::AuditFailed => "AUDIT_FAILED",

            AuditEvent::CollectionBegin => "COLLECTION_AUDIT_BEGIN",
            AuditEvent::CollectionComplete => "COLLECTION_AUDIT_COMPLETE",
            AuditEvent::CollectionSkipped => "COLLECTION_SKIPPED",
            AuditEvent::UnknownCustomRule => "UNKNOWN_CUSTOM_RULE",

            AuditEvent::DocumentInvalid => "DOCUMENT_INVALID",
            AuditEvent::DocumentFixed => "DOCUMENT_FIXED",
            AuditEvent::DocumentFixFailed => "DOCUMENT_FIX_FAILED",

            AuditEvent::ReportWritten => "REPORT_WRITTEN",
        }
    }

    /// Returns true if this event ends the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditEvent::AuditFailed)
    }

    /// Returns true if this event reports a recoverable problem
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            AuditEvent::CollectionSkipped
                | AuditEvent::UnknownCustomRule
                | AuditEvent::DocumentFixFailed
        )
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
