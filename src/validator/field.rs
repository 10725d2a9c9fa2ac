//! Per-field validation
//!
//! The type check always runs first. Constraints that only make sense for
//! one shape of value (string length, pattern, enum, numeric bounds, item
//! counts, nested properties) are evaluated only when the value actually has
//! that shape, so a mistyped value yields a single `invalid_type`.

use crate::document::FieldValue;
use crate::schema::{FieldSchema, FieldType};

use super::typecheck::is_valid_type;
use super::violation::{Violation, ViolationKind};

/// Validates one field value against its schema.
///
/// Nested `object` properties are validated recursively with dotted paths
/// (`address.city`). Each level checks the `required` list of the object
/// schema it is looking at.
pub fn validate_field(name: &str, value: &FieldValue, schema: &FieldSchema) -> Vec<Violation> {
    let mut violations = Vec::new();
    validate_into(name, value, schema, &mut violations);
    violations
}

fn validate_into(name: &str, value: &FieldValue, schema: &FieldSchema, out: &mut Vec<Violation>) {
    let Some(declared) = &schema.field_type else {
        return;
    };

    if !is_valid_type(value, declared) {
        out.push(Violation::new(ViolationKind::InvalidType {
            field: name.to_string(),
            expected: declared.type_name().to_string(),
            actual: value.type_name().to_string(),
        }));
        return;
    }

    match (declared, value) {
        (FieldType::String, FieldValue::String(s)) => check_string(name, s, value, schema, out),
        (FieldType::Number, _) => {
            if let Some(n) = value.as_f64() {
                check_number(name, n, schema, out);
            }
        }
        (FieldType::Array, FieldValue::Array(items)) => {
            if let Some(max) = schema.max_items {
                if items.len() > max {
                    out.push(Violation::new(ViolationKind::MaxItemsViolation {
                        field: name.to_string(),
                        max_items: max,
                        actual_items: items.len(),
                    }));
                }
            }
        }
        (FieldType::Object, FieldValue::Map(map)) => {
            let Some(properties) = &schema.properties else {
                return;
            };
            for (nested, nested_schema) in properties {
                let nested_path = format!("{}.{}", name, nested);
                match map.get(nested) {
                    Some(nested_value) => validate_into(&nested_path, nested_value, nested_schema, out),
                    None if schema.required.iter().any(|r| r == nested) => {
                        out.push(Violation::missing_required(nested_path));
                    }
                    None => {}
                }
            }
        }
        _ => {}
    }
}

fn check_string(
    name: &str,
    s: &str,
    value: &FieldValue,
    schema: &FieldSchema,
    out: &mut Vec<Violation>,
) {
    let length = s.chars().count();

    if let Some(min) = schema.min_length {
        if length < min {
            out.push(Violation::new(ViolationKind::MinLengthViolation {
                field: name.to_string(),
                min_length: min,
                actual_length: length,
            }));
        }
    }

    if let Some(max) = schema.max_length {
        if length > max {
            out.push(Violation::new(ViolationKind::MaxLengthViolation {
                field: name.to_string(),
                max_length: max,
                actual_length: length,
            }));
        }
    }

    if let Some(pattern) = &schema.pattern {
        if !pattern.is_match(s) {
            out.push(Violation::new(ViolationKind::PatternViolation {
                field: name.to_string(),
                pattern: pattern.as_str().to_string(),
                value: s.to_string(),
            }));
        }
    }

    if let Some(allowed) = &schema.allowed_values {
        if !allowed.contains(value) {
            out.push(Violation::new(ViolationKind::EnumViolation {
                field: name.to_string(),
                allowed_values: allowed.clone(),
                actual_value: value.clone(),
            }));
        }
    }
}

fn check_number(name: &str, n: f64, schema: &FieldSchema, out: &mut Vec<Violation>) {
    if let Some(min) = schema.minimum {
        if n < min {
            out.push(Violation::new(ViolationKind::MinimumViolation {
                field: name.to_string(),
                minimum: min,
                actual_value: n,
            }));
        }
    }

    if let Some(max) = schema.maximum {
        if n > max {
            out.push(Violation::new(ViolationKind::MaximumViolation {
                field: name.to_string(),
                maximum: max,
                actual_value: n,
            }));
        }
    }
}
