//! Automatic fixes
//!
//! The only fix is writing a schema `default` into a document that lacks a
//! required top-level field. Fix failures are logged and swallowed: the
//! document stays counted as invalid either way.

use crate::document::{Document, FieldMap};
use crate::observability::{log_event_with_fields, AuditEvent};
use crate::schema::CollectionSchema;
use crate::store::{DocumentStore, StoreError};
use crate::validator::{Violation, ViolationKind};

/// Result of trying to fix one document
#[derive(Debug, Clone)]
pub enum FixOutcome {
    /// No violation had a default to apply
    NothingToFix,
    /// The partial update was acknowledged by the store
    Applied(FieldMap),
    /// The store rejected the update
    Failed(StoreError),
}

impl FixOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FixOutcome::Applied(_))
    }
}

/// Computes the partial update for a document's violations.
///
/// Nested (dotted) fields are never fixed.
pub fn plan_fix(violations: &[Violation], schema: &CollectionSchema) -> FieldMap {
    let mut update = FieldMap::new();

    for violation in violations {
        let ViolationKind::MissingRequiredField { field } = &violation.kind else {
            continue;
        };
        let default = schema
            .properties
            .get(field)
            .and_then(|field_schema| field_schema.default.as_ref());
        if let Some(default) = default {
            update.insert(field.clone(), default.clone());
        }
    }

    update
}

/// Applies the planned fix for `document`, if any.
pub async fn fix_document<S: DocumentStore>(
    store: &S,
    document: &Document,
    violations: &[Violation],
    schema: &CollectionSchema,
) -> FixOutcome {
    let update = plan_fix(violations, schema);
    if update.is_empty() {
        return FixOutcome::NothingToFix;
    }

    let path = document.path().to_string();
    match store.update_document(document.path(), &update).await {
        Ok(()) => {
            let fields = update.keys().cloned().collect::<Vec<_>>().join(",");
            log_event_with_fields(
                AuditEvent::DocumentFixed,
                &[("document", path.as_str()), ("fields", fields.as_str())],
            );
            FixOutcome::Applied(update)
        }
        Err(e) => {
            log_event_with_fields(
                AuditEvent::DocumentFixFailed,
                &[("document", path.as_str()), ("reason", e.to_string().as_str())],
            );
            FixOutcome::Failed(e)
        }
    }
}
