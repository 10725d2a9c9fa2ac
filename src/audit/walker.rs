//! Collection traversal
//!
//! Top-level collections are fetched directly, capped by `limit`.
//! Subcollections are reached through their parents: every parent document
//! (capped by `parent_limit`) has its child collection fetched in full.

use crate::observability::{log_event_with_fields, AuditEvent};
use crate::schema::{CollectionPath, CollectionSchema};
use crate::store::DocumentStore;

use super::auditor::Auditor;
use super::errors::{AuditError, AuditResult};

impl<'a, S: DocumentStore> Auditor<'a, S> {
    /// Audits every reachable document of one schema collection.
    ///
    /// A fetch failure aborts with [`AuditError::Fetch`]; documents audited
    /// before the failure stay counted.
    pub async fn audit_collection(
        &mut self,
        name: &str,
        schema: &CollectionSchema,
    ) -> AuditResult<()> {
        let path = schema.collection_path(name);
        let display = path.display_path();

        if let CollectionPath::Unsupported { .. } = path {
            log_event_with_fields(
                AuditEvent::CollectionSkipped,
                &[("collection", name), ("path", display.as_str())],
            );
            return Ok(());
        }

        log_event_with_fields(
            AuditEvent::CollectionBegin,
            &[("collection", name), ("path", display.as_str())],
        );
        self.warn_unknown_rules(name, schema);

        let audited = match &path {
            CollectionPath::TopLevel { name: collection } => {
                self.audit_top_level(collection, schema).await?
            }
            CollectionPath::Nested { parent, child, .. } => {
                self.audit_nested(parent, child, &display, schema).await?
            }
            CollectionPath::Unsupported { .. } => 0,
        };

        log_event_with_fields(
            AuditEvent::CollectionComplete,
            &[
                ("collection", name),
                ("documents", audited.to_string().as_str()),
            ],
        );
        Ok(())
    }

    async fn audit_top_level(
        &mut self,
        collection: &str,
        schema: &CollectionSchema,
    ) -> AuditResult<usize> {
        let documents = self
            .store
            .fetch_documents(collection, self.options.fetch_limit())
            .await
            .map_err(|e| AuditError::fetch(collection, e))?;

        for document in &documents {
            self.audit_document(collection, document, schema).await;
        }
        Ok(documents.len())
    }

    async fn audit_nested(
        &mut self,
        parent: &str,
        child: &str,
        display: &str,
        schema: &CollectionSchema,
    ) -> AuditResult<usize> {
        let parents = self
            .store
            .fetch_documents(parent, self.options.parent_fetch_limit())
            .await
            .map_err(|e| AuditError::fetch(parent, e))?;

        let mut audited = 0;
        for parent_doc in &parents {
            let collection = format!("{}/{}/{}", parent, parent_doc.id(), child);
            let documents = self
                .store
                .fetch_documents(&collection, None)
                .await
                .map_err(|e| AuditError::fetch(collection.as_str(), e))?;

            for document in documents {
                let document = document.with_parent(parent_doc.id());
                self.audit_document(display, &document, schema).await;
                audited += 1;
            }
        }
        Ok(audited)
    }

    fn warn_unknown_rules(&self, name: &str, schema: &CollectionSchema) {
        for rule in schema.custom_validations.keys() {
            if !self.rules.contains(rule) {
                log_event_with_fields(
                    AuditEvent::UnknownCustomRule,
                    &[("collection", name), ("rule", rule.as_str())],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditError, AuditOptions, Auditor};
    use crate::schema::{CollectionSchema, FieldSchema, FieldType};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn events_schema() -> CollectionSchema {
        CollectionSchema::new("bars/{barId}/events")
            .require("title")
            .property("title", FieldSchema::of_type(FieldType::String))
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_json("bars", "b1", json!({"name": "A"})).unwrap();
        store.insert_json("bars", "b2", json!({"name": "B"})).unwrap();
        store
            .insert_json("bars/b1/events", "e1", json!({"title": "Quiz"}))
            .unwrap();
        store.insert_json("bars/b1/events", "e2", json!({})).unwrap();
        store.insert_json("bars/b2/events", "e3", json!({})).unwrap();
        store
    }

    #[tokio::test]
    async fn test_nested_collection_walks_every_parent() {
        let store = seeded();
        let mut auditor = Auditor::new(&store, AuditOptions::default());
        auditor
            .audit_collection("events", &events_schema())
            .await
            .unwrap();

        let (stats, audited) = auditor.finish();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.invalid_documents, 2);
        assert_eq!(stats.collection("bars").unwrap().total, 3);

        assert_eq!(audited[0].document, "bars/b1/events/e2");
        assert_eq!(audited[0].collection, "bars/{barId}/events");
        assert_eq!(audited[0].context.parent_id.as_deref(), Some("b1"));
        assert_eq!(audited[1].context.parent_id.as_deref(), Some("b2"));
    }

    #[tokio::test]
    async fn test_parent_limit_caps_parents_not_children() {
        let store = seeded();
        let options = AuditOptions {
            parent_limit: 1,
            ..AuditOptions::default()
        };
        let mut auditor = Auditor::new(&store, options);
        auditor
            .audit_collection("events", &events_schema())
            .await
            .unwrap();

        assert_eq!(auditor.stats().total_documents, 2);
    }

    #[tokio::test]
    async fn test_top_level_limit() {
        let store = seeded();
        let options = AuditOptions {
            limit: 1,
            ..AuditOptions::default()
        };
        let mut auditor = Auditor::new(&store, options);
        auditor
            .audit_collection("bars", &CollectionSchema::new("bars"))
            .await
            .unwrap();

        assert_eq!(auditor.stats().total_documents, 1);
    }

    #[tokio::test]
    async fn test_unsupported_path_is_skipped() {
        let store = seeded();
        let mut auditor = Auditor::new(&store, AuditOptions::default());
        auditor
            .audit_collection("deep", &CollectionSchema::new("a/{x}/b/{y}/c"))
            .await
            .unwrap();

        assert_eq!(auditor.stats().total_documents, 0);
        assert!(auditor.stats().collections.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let store = seeded();
        store.fail_fetch("bars/b2/events").unwrap();
        let mut auditor = Auditor::new(&store, AuditOptions::default());

        let err = auditor
            .audit_collection("events", &events_schema())
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Fetch { ref collection, .. } if collection == "bars/b2/events"));
        assert_eq!(auditor.stats().total_documents, 2);
    }

    #[tokio::test]
    async fn test_path_defaults_to_collection_name() {
        let store = seeded();
        let mut auditor = Auditor::new(&store, AuditOptions::default());
        let mut schema = CollectionSchema::new("bars");
        schema.path = None;

        auditor.audit_collection("bars", &schema).await.unwrap();
        assert_eq!(auditor.stats().collection("bars").unwrap().total, 2);
    }
}
