//! Schema type definitions
//!
//! Schema file layout:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "title": "...",
//!   "collections": {
//!     "bars": { "path": "bars", "required": [..], "properties": {..} },
//!     "events": { "path": "bars/{barId}/events", "customValidations": {..} }
//!   }
//! }
//! ```
//!
//! Supported field types: string, number, boolean, array, object,
//! timestamp. Any other declared type is accepted by every value.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::document::FieldValue;

use super::path::CollectionPath;

/// Declared field type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Timestamp,
    /// Unrecognised type name; never produces a type violation
    Other(String),
}

impl FieldType {
    /// Returns the type name as written in the schema
    pub fn type_name(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Timestamp => "timestamp",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "array" => FieldType::Array,
            "object" => FieldType::Object,
            "timestamp" => FieldType::Timestamp,
            _ => FieldType::Other(name),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A `pattern` constraint, compiled when the schema is loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl FieldPattern {
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    /// Pattern text as written in the schema
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, like a JavaScript `RegExp.test`
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl TryFrom<String> for FieldPattern {
    type Error = String;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        FieldPattern::new(source.clone())
            .map_err(|e| format!("invalid pattern '{}': {}", source, e))
    }
}

impl PartialEq for FieldPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Schema of a single field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,

    // string
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<FieldPattern>,
    #[serde(rename = "enum", default)]
    pub allowed_values: Option<Vec<FieldValue>>,

    // number
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,

    // array
    #[serde(default)]
    pub max_items: Option<usize>,

    // object
    #[serde(default)]
    pub properties: Option<BTreeMap<String, FieldSchema>>,
    #[serde(default)]
    pub required: Vec<String>,

    /// Value written by the fixer when the field is missing
    #[serde(default)]
    pub default: Option<FieldValue>,

    #[serde(default)]
    pub description: Option<String>,
}

impl FieldSchema {
    /// Creates a schema with only a type
    pub fn of_type(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = Some(default);
        self
    }

    fn check_structure(&self, field_path: &str) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(format!(
                    "field '{}': minLength {} exceeds maxLength {}",
                    field_path, min, max
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                return Err(format!(
                    "field '{}': minimum {} exceeds maximum {}",
                    field_path, min, max
                ));
            }
        }
        if let Some(props) = &self.properties {
            for (name, nested) in props {
                nested.check_structure(&format!("{}.{}", field_path, name))?;
            }
        }
        Ok(())
    }
}

/// Descriptor of a named cross-field rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomRuleSpec {
    #[serde(default)]
    pub description: String,

    /// Rule-specific settings, kept as written
    #[serde(flatten)]
    pub settings: BTreeMap<String, Value>,
}

impl CustomRuleSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            settings: BTreeMap::new(),
        }
    }
}

/// Schema of one collection (or subcollection).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    /// Store path; may contain one `{param}` segment
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSchema>,
    #[serde(default)]
    pub custom_validations: BTreeMap<String, CustomRuleSpec>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CollectionSchema {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn custom_rule(mut self, name: impl Into<String>, rule: CustomRuleSpec) -> Self {
        self.custom_validations.insert(name.into(), rule);
        self
    }

    /// Parses the store path; a collection without `path` lives at its name.
    pub fn collection_path(&self, name: &str) -> CollectionPath {
        CollectionPath::parse(self.path.as_deref().unwrap_or(name))
    }
}

/// A complete schema file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionSchema>,
}

impl Schema {
    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        for (name, collection) in &self.collections {
            if let Some(path) = &collection.path {
                if path.split('/').any(str::is_empty) {
                    return Err(format!("collection '{}': malformed path '{}'", name, path));
                }
            }
            for (field, field_schema) in &collection.properties {
                field_schema
                    .check_structure(field)
                    .map_err(|e| format!("collection '{}': {}", name, e))?;
            }
        }
        Ok(())
    }
}
