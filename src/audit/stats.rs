//! Running statistics of one audit
//!
//! Counters only grow. Every processed document lands in exactly one of
//! valid/invalid, so `valid + invalid == total` holds globally and per
//! collection. Subcollection documents count toward their root collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::top_level_name;

/// Tally of one top-level collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
    pub fixed: u64,
}

/// Global and per-collection counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total_documents: u64,
    pub valid_documents: u64,
    pub invalid_documents: u64,
    pub fixed_documents: u64,
    pub collections: BTreeMap<String, CollectionStats>,
}

impl AuditStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection_mut(&mut self, collection_path: &str) -> &mut CollectionStats {
        self.collections
            .entry(top_level_name(collection_path).to_string())
            .or_default()
    }

    /// Counts a document that produced no violations.
    pub fn record_valid(&mut self, collection_path: &str) {
        self.total_documents += 1;
        self.valid_documents += 1;
        let entry = self.collection_mut(collection_path);
        entry.total += 1;
        entry.valid += 1;
    }

    /// Counts a document that produced at least one violation.
    pub fn record_invalid(&mut self, collection_path: &str) {
        self.total_documents += 1;
        self.invalid_documents += 1;
        let entry = self.collection_mut(collection_path);
        entry.total += 1;
        entry.invalid += 1;
    }

    /// Counts a successful fix of an already-invalid document.
    pub fn record_fixed(&mut self, collection_path: &str) {
        self.fixed_documents += 1;
        self.collection_mut(collection_path).fixed += 1;
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionStats> {
        self.collections.get(name)
    }

    /// Checks the counter invariants
    pub fn is_consistent(&self) -> bool {
        let global = self.valid_documents + self.invalid_documents == self.total_documents
            && self.fixed_documents <= self.invalid_documents;
        global
            && self
                .collections
                .values()
                .all(|c| c.valid + c.invalid == c.total && c.fixed <= c.invalid)
    }
}
