//! Dynamic field values
//!
//! Store documents are untyped; every field is one of the variants below.
//! Timestamps are a distinct variant so that `timestamp` fields can be told
//! apart from strings and numbers. In JSON a timestamp is the store's export
//! shape `{"_seconds": .., "_nanoseconds": ..}`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Field name to value, ordered by name.
pub type FieldMap = BTreeMap<String, FieldValue>;

const SECONDS_KEY: &str = "_seconds";
const NANOS_KEY: &str = "_nanoseconds";

/// A single document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<FieldValue>),
    Map(FieldMap),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Converts a JSON value, recognising exported timestamps.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from_json).collect())
            }
            Value::Object(obj) => match timestamp_from_object(&obj) {
                Some(ts) => FieldValue::Timestamp(ts),
                None => FieldValue::Map(
                    obj.into_iter()
                        .map(|(k, v)| (k, FieldValue::from_json(v)))
                        .collect(),
                ),
            },
        }
    }

    /// Converts back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Double(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Array(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            FieldValue::Timestamp(ts) => {
                let mut obj = Map::new();
                obj.insert(SECONDS_KEY.into(), Value::from(ts.timestamp()));
                obj.insert(NANOS_KEY.into(), Value::from(ts.timestamp_subsec_nanos()));
                Value::Object(obj)
            }
        }
    }

    /// Type name used in `invalid_type` details.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) | FieldValue::Double(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "object",
            FieldValue::Timestamp(_) => "timestamp",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Double(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// False for null, `false`, zero, NaN and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Boolean(b) => *b,
            FieldValue::Integer(i) => *i != 0,
            FieldValue::Double(f) => *f != 0.0 && !f.is_nan(),
            FieldValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Resolves the value to a point in time.
    ///
    /// Timestamps convert directly, strings are parsed as RFC 3339 and
    /// numbers are read as epoch milliseconds. Anything else has no date.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            FieldValue::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            FieldValue::Integer(ms) => DateTime::from_timestamp_millis(*ms),
            FieldValue::Double(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FieldValue::from_json)
    }
}

/// Converts a JSON object into a field map.
pub fn fields_from_json(obj: Map<String, Value>) -> FieldMap {
    obj.into_iter()
        .map(|(k, v)| (k, FieldValue::from_json(v)))
        .collect()
}

fn timestamp_from_object(obj: &Map<String, Value>) -> Option<DateTime<Utc>> {
    if obj.len() != 2 {
        return None;
    }
    let seconds = obj.get(SECONDS_KEY)?.as_i64()?;
    let nanos = u32::try_from(obj.get(NANOS_KEY)?.as_u64()?).ok()?;
    DateTime::from_timestamp(seconds, nanos)
}
