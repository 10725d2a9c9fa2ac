//! One complete audit run over every schema collection.

use crate::observability::{log_event_with_fields, AuditEvent};
use crate::schema::Schema;
use crate::store::DocumentStore;
use crate::validator::RuleRegistry;

use super::auditor::Auditor;
use super::errors::AuditResult;
use super::options::AuditOptions;
use super::report::AuditReport;

/// Audits every collection of `schema`, in schema order.
///
/// Collections are processed sequentially. The first fetch failure aborts
/// the run and no report is produced.
pub async fn run_audit<S: DocumentStore>(
    store: &S,
    schema: &Schema,
    options: AuditOptions,
    rules: RuleRegistry,
) -> AuditResult<AuditReport> {
    let collections = schema.collections.len().to_string();
    log_event_with_fields(
        AuditEvent::AuditBegin,
        &[
            ("collections", collections.as_str()),
            ("fix", if options.fix_enabled() { "true" } else { "false" }),
        ],
    );

    let mut auditor = Auditor::with_rules(store, options, rules);
    for (name, collection) in &schema.collections {
        auditor.audit_collection(name, collection).await?;
    }

    let (stats, audited) = auditor.finish();
    Ok(AuditReport::build(schema, options, stats, audited))
}
