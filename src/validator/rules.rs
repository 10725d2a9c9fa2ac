//! Cross-field custom rules
//!
//! Rules are looked up by the name used under `customValidations` in the
//! schema. A rule whose inputs are absent from the document does not apply
//! and reports nothing.

use std::collections::HashMap;

use crate::document::{Document, FieldValue};
use crate::schema::CustomRuleSpec;

use super::violation::Violation;

/// Name of the built-in temporal ordering rule
pub const END_AT_AFTER_START_AT: &str = "endAtAfterStartAt";

/// A named check over a whole document.
pub trait CustomRule: Send + Sync {
    fn evaluate(&self, document: &Document, spec: &CustomRuleSpec, rule_name: &str)
        -> Vec<Violation>;
}

/// Fails when `later` resolves to a strictly earlier instant than `earlier`.
#[derive(Debug, Clone)]
pub struct FieldOrderRule {
    earlier: String,
    later: String,
}

impl FieldOrderRule {
    pub fn new(earlier: impl Into<String>, later: impl Into<String>) -> Self {
        Self {
            earlier: earlier.into(),
            later: later.into(),
        }
    }

    fn instant(document: &Document, field: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        document
            .get(field)
            .filter(|v| v.is_truthy())
            .and_then(FieldValue::to_datetime)
    }
}

impl CustomRule for FieldOrderRule {
    fn evaluate(
        &self,
        document: &Document,
        spec: &CustomRuleSpec,
        rule_name: &str,
    ) -> Vec<Violation> {
        let (Some(start), Some(end)) = (
            Self::instant(document, &self.earlier),
            Self::instant(document, &self.later),
        ) else {
            return Vec::new();
        };

        if end < start {
            vec![Violation::custom_failed(rule_name, spec.description.clone())]
        } else {
            Vec::new()
        }
    }
}

/// Custom rules by name.
pub struct RuleRegistry {
    rules: HashMap<String, Box<dyn CustomRule>>,
}

impl RuleRegistry {
    /// Registry with no rules at all
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registry with the rules shipped with the auditor
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::empty();
        registry.register(
            END_AT_AFTER_START_AT,
            FieldOrderRule::new("startAt", "endAt"),
        );
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, rule: impl CustomRule + 'static) {
        self.rules.insert(name.into(), Box::new(rule));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Evaluates the named rule. `None` means no rule has that name.
    pub fn evaluate(
        &self,
        document: &Document,
        spec: &CustomRuleSpec,
        rule_name: &str,
    ) -> Option<Vec<Violation>> {
        self.rules
            .get(rule_name)
            .map(|rule| rule.evaluate(document, spec, rule_name))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{fields_from_json, DocumentPath};
    use serde_json::json;

    fn event(value: serde_json::Value) -> Document {
        let fields = match value {
            serde_json::Value::Object(obj) => fields_from_json(obj),
            _ => unreachable!(),
        };
        Document::new(DocumentPath::new("bars/b1/events", "e1"), fields)
    }

    fn ts(seconds: i64) -> serde_json::Value {
        json!({"_seconds": seconds, "_nanoseconds": 0})
    }

    #[test]
    fn test_end_before_start_fails() {
        let registry = RuleRegistry::with_builtin_rules();
        let spec = CustomRuleSpec::new("endAt must be after startAt");
        let doc = event(json!({"startAt": ts(2000), "endAt": ts(1000)}));

        let violations = registry.evaluate(&doc, &spec, END_AT_AFTER_START_AT).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            Violation::custom_failed(END_AT_AFTER_START_AT, "endAt must be after startAt")
        );
    }

    #[test]
    fn test_ordered_or_equal_passes() {
        let registry = RuleRegistry::with_builtin_rules();
        let spec = CustomRuleSpec::new("d");

        let ordered = event(json!({"startAt": ts(1000), "endAt": ts(2000)}));
        assert!(registry.evaluate(&ordered, &spec, END_AT_AFTER_START_AT).unwrap().is_empty());

        let equal = event(json!({"startAt": ts(1000), "endAt": ts(1000)}));
        assert!(registry.evaluate(&equal, &spec, END_AT_AFTER_START_AT).unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_not_applicable() {
        let registry = RuleRegistry::with_builtin_rules();
        let spec = CustomRuleSpec::new("d");
        let doc = event(json!({"endAt": ts(1000)}));
        assert!(registry.evaluate(&doc, &spec, END_AT_AFTER_START_AT).unwrap().is_empty());

        let null_start = event(json!({"startAt": null, "endAt": ts(1000)}));
        assert!(registry.evaluate(&null_start, &spec, END_AT_AFTER_START_AT).unwrap().is_empty());
    }

    #[test]
    fn test_string_dates_are_converted() {
        let registry = RuleRegistry::with_builtin_rules();
        let spec = CustomRuleSpec::new("d");
        let doc = event(json!({
            "startAt": "2024-05-02T20:00:00Z",
            "endAt": "2024-05-01T20:00:00Z"
        }));
        assert_eq!(registry.evaluate(&doc, &spec, END_AT_AFTER_START_AT).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_rule() {
        let registry = RuleRegistry::with_builtin_rules();
        let doc = event(json!({}));
        assert!(registry.evaluate(&doc, &CustomRuleSpec::default(), "noSuchRule").is_none());
        assert!(registry.contains(END_AT_AFTER_START_AT));
    }

    #[test]
    fn test_register_custom_rule() {
        let mut registry = RuleRegistry::empty();
        registry.register("closesAfterOpens", FieldOrderRule::new("opensAt", "closesAt"));

        let doc = event(json!({"opensAt": ts(50), "closesAt": ts(10)}));
        let violations = registry
            .evaluate(&doc, &CustomRuleSpec::new("d"), "closesAfterOpens")
            .unwrap();
        assert_eq!(violations[0].kind.name(), "custom_validation_failed");
    }
}
