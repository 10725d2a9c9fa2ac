//! Runtime value vs declared type

use crate::document::FieldValue;
use crate::schema::FieldType;

/// Returns true if `value` conforms to `declared`.
///
/// `object` excludes arrays, null and timestamps. Only timestamps satisfy
/// `timestamp`. Unknown declared types accept everything.
pub fn is_valid_type(value: &FieldValue, declared: &FieldType) -> bool {
    match declared {
        FieldType::String => matches!(value, FieldValue::String(_)),
        FieldType::Number => matches!(value, FieldValue::Integer(_) | FieldValue::Double(_)),
        FieldType::Boolean => matches!(value, FieldValue::Boolean(_)),
        FieldType::Array => matches!(value, FieldValue::Array(_)),
        FieldType::Object => matches!(value, FieldValue::Map(_)),
        FieldType::Timestamp => matches!(value, FieldValue::Timestamp(_)),
        FieldType::Other(_) => true,
    }
}
