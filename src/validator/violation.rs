//! Violation taxonomy
//!
//! Serialized shape: `{"type": "...", "field": "...", <details>, "severity": "..."}`.
//! `unknown_field` is a warning; every other violation is an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::FieldValue;

/// How much a violation matters to the run's exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    /// Informational only
    Warning,
    /// Makes the audit fail
    Error,
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationSeverity::Warning => f.write_str("warning"),
            ViolationSeverity::Error => f.write_str("error"),
        }
    }
}

/// What was wrong, with type-specific details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRequiredField {
        field: String,
    },
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },
    #[serde(rename_all = "camelCase")]
    MinLengthViolation {
        field: String,
        min_length: usize,
        actual_length: usize,
    },
    #[serde(rename_all = "camelCase")]
    MaxLengthViolation {
        field: String,
        max_length: usize,
        actual_length: usize,
    },
    PatternViolation {
        field: String,
        pattern: String,
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    EnumViolation {
        field: String,
        allowed_values: Vec<FieldValue>,
        actual_value: FieldValue,
    },
    #[serde(rename_all = "camelCase")]
    MinimumViolation {
        field: String,
        minimum: f64,
        actual_value: f64,
    },
    #[serde(rename_all = "camelCase")]
    MaximumViolation {
        field: String,
        maximum: f64,
        actual_value: f64,
    },
    #[serde(rename_all = "camelCase")]
    MaxItemsViolation {
        field: String,
        max_items: usize,
        actual_items: usize,
    },
    UnknownField {
        field: String,
    },
    CustomValidationFailed {
        rule: String,
        description: String,
    },
}

impl ViolationKind {
    /// Returns the `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequiredField { .. } => "missing_required_field",
            ViolationKind::InvalidType { .. } => "invalid_type",
            ViolationKind::MinLengthViolation { .. } => "min_length_violation",
            ViolationKind::MaxLengthViolation { .. } => "max_length_violation",
            ViolationKind::PatternViolation { .. } => "pattern_violation",
            ViolationKind::EnumViolation { .. } => "enum_violation",
            ViolationKind::MinimumViolation { .. } => "minimum_violation",
            ViolationKind::MaximumViolation { .. } => "maximum_violation",
            ViolationKind::MaxItemsViolation { .. } => "max_items_violation",
            ViolationKind::UnknownField { .. } => "unknown_field",
            ViolationKind::CustomValidationFailed { .. } => "custom_validation_failed",
        }
    }

    /// Field the violation refers to; cross-field rules have none
    pub fn field(&self) -> Option<&str> {
        match self {
            ViolationKind::MissingRequiredField { field }
            | ViolationKind::InvalidType { field, .. }
            | ViolationKind::MinLengthViolation { field, .. }
            | ViolationKind::MaxLengthViolation { field, .. }
            | ViolationKind::PatternViolation { field, .. }
            | ViolationKind::EnumViolation { field, .. }
            | ViolationKind::MinimumViolation { field, .. }
            | ViolationKind::MaximumViolation { field, .. }
            | ViolationKind::MaxItemsViolation { field, .. }
            | ViolationKind::UnknownField { field } => Some(field),
            ViolationKind::CustomValidationFailed { .. } => None,
        }
    }

    pub fn severity(&self) -> ViolationSeverity {
        match self {
            ViolationKind::UnknownField { .. } => ViolationSeverity::Warning,
            _ => ViolationSeverity::Error,
        }
    }
}

/// A single deviation between a document and its schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(flatten)]
    pub kind: ViolationKind,
    pub severity: ViolationSeverity,
}

impl Violation {
    pub fn new(kind: ViolationKind) -> Self {
        let severity = kind.severity();
        Self { kind, severity }
    }

    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::new(ViolationKind::MissingRequiredField {
            field: field.into(),
        })
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(ViolationKind::UnknownField {
            field: field.into(),
        })
    }

    pub fn custom_failed(rule: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ViolationKind::CustomValidationFailed {
            rule: rule.into(),
            description: description.into(),
        })
    }

    pub fn field(&self) -> Option<&str> {
        self.kind.field()
    }

    pub fn is_error(&self) -> bool {
        self.severity == ViolationSeverity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field() {
            Some(field) => write!(f, "[{}] {} on '{}'", self.severity, self.kind.name(), field),
            None => write!(f, "[{}] {}", self.severity, self.kind.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_follows_kind() {
        assert_eq!(Violation::unknown_field("x").severity, ViolationSeverity::Warning);
        assert!(Violation::missing_required("name").is_error());
        assert!(Violation::custom_failed("r", "d").is_error());
    }

    #[test]
    fn test_serialized_shape() {
        let v = Violation::new(ViolationKind::MinLengthViolation {
            field: "name".into(),
            min_length: 3,
            actual_length: 1,
        });

        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!({
                "type": "min_length_violation",
                "field": "name",
                "minLength": 3,
                "actualLength": 1,
                "severity": "error"
            })
        );
    }

    #[test]
    fn test_enum_violation_shape() {
        let v = Violation::new(ViolationKind::EnumViolation {
            field: "status".into(),
            allowed_values: vec![FieldValue::from("open")],
            actual_value: FieldValue::from("gone"),
        });
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["allowedValues"], json!(["open"]));
        assert_eq!(json["actualValue"], "gone");
    }

    #[test]
    fn test_reads_back_from_report_json() {
        let v: Violation = serde_json::from_value(json!({
            "type": "custom_validation_failed",
            "rule": "endAtAfterStartAt",
            "description": "endAt after startAt",
            "severity": "error"
        }))
        .unwrap();
        assert_eq!(v.field(), None);
        assert_eq!(v.kind.name(), "custom_validation_failed");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Violation::unknown_field("extra").to_string(),
            "[warning] unknown_field on 'extra'"
        );
    }
}
