//! Document auditor
//!
//! Violations for one document are gathered in a fixed order:
//!
//! 1. required fields missing from the document
//! 2. declared properties present in the document (schema order)
//! 3. document fields the schema does not declare (warnings)
//! 4. custom rules (schema order)

use crate::document::Document;
use crate::observability::{AuditEvent, Logger};
use crate::schema::{top_level_name, CollectionSchema};
use crate::store::DocumentStore;
use crate::validator::{validate_field, RuleRegistry, Violation};

use super::fixer::fix_document;
use super::options::AuditOptions;
use super::report::AuditedDocument;
use super::stats::AuditStats;

/// Checks a document against its collection schema.
pub fn check_document(
    document: &Document,
    schema: &CollectionSchema,
    rules: &RuleRegistry,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for field in &schema.required {
        if !document.contains(field) {
            violations.push(Violation::missing_required(field.as_str()));
        }
    }

    for (name, field_schema) in &schema.properties {
        if let Some(value) = document.get(name) {
            violations.extend(validate_field(name, value, field_schema));
        }
    }

    for name in document.fields().keys() {
        if !schema.properties.contains_key(name) {
            violations.push(Violation::unknown_field(name.as_str()));
        }
    }

    for (rule_name, spec) in &schema.custom_validations {
        if let Some(found) = rules.evaluate(document, spec, rule_name) {
            violations.extend(found);
        }
    }

    violations
}

/// Accumulates the results of one audit run.
///
/// Owns the statistics and the list of invalid documents; both are scoped
/// to the run and handed back by [`Auditor::finish`].
pub struct Auditor<'a, S: DocumentStore> {
    pub(super) store: &'a S,
    pub(super) rules: RuleRegistry,
    pub(super) options: AuditOptions,
    pub(super) stats: AuditStats,
    audited: Vec<AuditedDocument>,
}

impl<'a, S: DocumentStore> Auditor<'a, S> {
    /// Auditor with the built-in custom rules
    pub fn new(store: &'a S, options: AuditOptions) -> Self {
        Self::with_rules(store, options, RuleRegistry::with_builtin_rules())
    }

    pub fn with_rules(store: &'a S, options: AuditOptions, rules: RuleRegistry) -> Self {
        Self {
            store,
            rules,
            options,
            stats: AuditStats::new(),
            audited: Vec::new(),
        }
    }

    pub fn stats(&self) -> &AuditStats {
        &self.stats
    }

    pub fn audited(&self) -> &[AuditedDocument] {
        &self.audited
    }

    /// Audits one document and records the outcome.
    ///
    /// `collection_path` is the schema path of the collection; its first
    /// segment names the statistics bucket. With fixing enabled, invalid
    /// documents get their defaults written back, which never changes their
    /// invalid status.
    pub async fn audit_document(
        &mut self,
        collection_path: &str,
        document: &Document,
        schema: &CollectionSchema,
    ) {
        let violations = check_document(document, schema, &self.rules);
        let bucket = top_level_name(collection_path);

        if violations.is_empty() {
            self.stats.record_valid(bucket);
            return;
        }

        let path = document.path().to_string();
        let count = violations.len().to_string();
        Logger::trace(
            AuditEvent::DocumentInvalid.as_str(),
            &[("document", path.as_str()), ("violations", count.as_str())],
        );

        self.stats.record_invalid(bucket);
        let entry = AuditedDocument::new(collection_path, document, violations);

        if self.options.fix_enabled() {
            let outcome = fix_document(self.store, document, &entry.issues, schema).await;
            if outcome.is_applied() {
                self.stats.record_fixed(bucket);
            }
        }

        self.audited.push(entry);
    }

    /// Ends the run, returning statistics and invalid documents.
    pub fn finish(self) -> (AuditStats, Vec<AuditedDocument>) {
        (self.stats, self.audited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{fields_from_json, DocumentPath, FieldValue};
    use crate::schema::{CustomRuleSpec, FieldSchema, FieldType};
    use crate::store::MemoryStore;
    use crate::validator::END_AT_AFTER_START_AT;
    use serde_json::{json, Value};

    fn doc(collection: &str, id: &str, value: Value) -> Document {
        let Value::Object(obj) = value else { unreachable!() };
        Document::new(DocumentPath::new(collection, id), fields_from_json(obj))
    }

    fn bars_schema() -> CollectionSchema {
        CollectionSchema::new("bars")
            .require("name")
            .property(
                "name",
                FieldSchema::of_type(FieldType::String).with_default(FieldValue::from("Untitled")),
            )
            .property("city", FieldSchema::of_type(FieldType::String))
    }

    fn kinds(violations: &[Violation]) -> Vec<&'static str> {
        violations.iter().map(|v| v.kind.name()).collect()
    }

    #[test]
    fn test_valid_document_has_no_violations() {
        let rules = RuleRegistry::default();
        let d = doc("bars", "b1", json!({"name": "Boteco"}));
        assert!(check_document(&d, &bars_schema(), &rules).is_empty());
    }

    #[test]
    fn test_violation_order() {
        let rules = RuleRegistry::default();
        let schema = bars_schema()
            .require("city")
            .property("startAt", FieldSchema::of_type(FieldType::Timestamp))
            .property("endAt", FieldSchema::of_type(FieldType::Timestamp))
            .custom_rule(END_AT_AFTER_START_AT, CustomRuleSpec::new("ordering"));

        let d = doc(
            "bars",
            "b1",
            json!({
                "name": 42,
                "zzz": true,
                "startAt": {"_seconds": 20, "_nanoseconds": 0},
                "endAt": {"_seconds": 10, "_nanoseconds": 0}
            }),
        );

        let violations = check_document(&d, &schema, &rules);
        assert_eq!(
            kinds(&violations),
            vec![
                "missing_required_field",
                "invalid_type",
                "unknown_field",
                "custom_validation_failed"
            ]
        );
        assert_eq!(violations[0].field(), Some("city"));
        assert_eq!(violations[2].field(), Some("zzz"));
    }

    #[test]
    fn test_one_violation_per_missing_field() {
        let rules = RuleRegistry::default();
        let schema = bars_schema().require("city").require("phone");
        let violations = check_document(&doc("bars", "b1", json!({})), &schema, &rules);

        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|v| v.is_error()));
    }

    #[tokio::test]
    async fn test_audit_counts_and_records() {
        let store = MemoryStore::new();
        let mut auditor = Auditor::new(&store, AuditOptions::default());
        let schema = bars_schema();

        auditor
            .audit_document("bars", &doc("bars", "b1", json!({"name": "Boteco"})), &schema)
            .await;
        auditor
            .audit_document("bars", &doc("bars", "b2", json!({"extra": 1})), &schema)
            .await;

        let stats = auditor.stats();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.valid_documents, 1);
        assert_eq!(stats.invalid_documents, 1);
        assert!(stats.is_consistent());

        assert_eq!(auditor.audited().len(), 1);
        assert_eq!(auditor.audited()[0].document_id, "b2");
        assert_eq!(kinds(&auditor.audited()[0].issues), vec!["missing_required_field", "unknown_field"]);
    }

    #[tokio::test]
    async fn test_fix_mode_writes_default() {
        let store = MemoryStore::new();
        store.insert_json("bars", "b1", json!({})).unwrap();
        let d = store.fetch_documents("bars", None).await.unwrap().remove(0);

        let options = AuditOptions {
            fix: true,
            ..AuditOptions::default()
        };
        let mut auditor = Auditor::new(&store, options);
        auditor.audit_document("bars", &d, &bars_schema()).await;

        assert_eq!(auditor.stats().fixed_documents, 1);
        assert_eq!(auditor.stats().invalid_documents, 1);
        let fields = store.get(&DocumentPath::new("bars", "b1")).unwrap().unwrap();
        assert_eq!(fields["name"], FieldValue::from("Untitled"));
    }

    #[tokio::test]
    async fn test_report_only_never_writes() {
        let store = MemoryStore::new();
        store.insert_json("bars", "b1", json!({})).unwrap();
        let d = store.fetch_documents("bars", None).await.unwrap().remove(0);

        let options = AuditOptions {
            fix: true,
            report_only: true,
            ..AuditOptions::default()
        };
        let mut auditor = Auditor::new(&store, options);
        auditor.audit_document("bars", &d, &bars_schema()).await;

        assert_eq!(auditor.stats().fixed_documents, 0);
        let fields = store.get(&DocumentPath::new("bars", "b1")).unwrap().unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_failed_fix_keeps_document_invalid() {
        let store = MemoryStore::new();
        store.insert_json("bars", "b1", json!({})).unwrap();
        store.fail_all_updates().unwrap();
        let d = store.fetch_documents("bars", None).await.unwrap().remove(0);

        let options = AuditOptions {
            fix: true,
            ..AuditOptions::default()
        };
        let mut auditor = Auditor::new(&store, options);
        auditor.audit_document("bars", &d, &bars_schema()).await;

        let (stats, audited) = auditor.finish();
        assert_eq!(stats.invalid_documents, 1);
        assert_eq!(stats.fixed_documents, 0);
        assert_eq!(audited.len(), 1);
    }
}
