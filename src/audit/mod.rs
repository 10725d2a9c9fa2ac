//! # Audit
//!
//! Walks every schema collection through a [`DocumentStore`], validates each
//! document, optionally writes schema defaults back, and assembles an
//! [`AuditReport`].
//!
//! Audit is read-only unless fixing is enabled and `report_only` is off.
//! Running it twice on an unchanged store yields the same report apart from
//! the timestamp.
//!
//! [`DocumentStore`]: crate::store::DocumentStore

mod auditor;
mod errors;
mod fixer;
mod options;
mod report;
mod runner;
mod stats;
mod walker;

pub use auditor::{check_document, Auditor};
pub use errors::{AuditError, AuditResult};
pub use fixer::{fix_document, plan_fix, FixOutcome};
pub use options::{AuditOptions, DEFAULT_LIMIT};
pub use report::{
    sanitize_data, AuditContext, AuditReport, AuditedDocument, SchemaIdentity, Summary, REDACTED,
    SENSITIVE_FIELDS,
};
pub use runner::run_audit;
pub use stats::{AuditStats, CollectionStats};
