//! Schema loader
//!
//! Missing or malformed schema files are fatal for the run.

use std::fs;
use std::path::Path;

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// Reads and checks schema files.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Loads a schema file from disk.
    pub fn load(path: &Path) -> SchemaResult<Schema> {
        let display = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SchemaError::NotFound(display.clone())
            } else {
                SchemaError::Unreadable {
                    path: display.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        Self::parse(&display, &content)
    }

    /// Parses schema JSON; `origin` names the source in errors.
    pub fn parse(origin: &str, content: &str) -> SchemaResult<Schema> {
        let schema: Schema = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(origin, format!("Invalid JSON: {}", e)))?;

        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed(origin, e))?;

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CollectionPath, FieldType};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "version": "1.0.0",
        "title": "Bars",
        "collections": {
            "bars": {
                "path": "bars",
                "required": ["name"],
                "properties": {
                    "name": {"type": "string", "minLength": 1}
                }
            },
            "events": {
                "path": "bars/{barId}/events",
                "customValidations": {
                    "endAtAfterStartAt": {"description": "endAt must follow startAt"}
                }
            }
        }
    }"#;

    #[test]
    fn test_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schema.json");
        fs::write(&path, SAMPLE).unwrap();

        let schema = SchemaLoader::load(&path).unwrap();
        assert_eq!(schema.title.as_deref(), Some("Bars"));
        assert_eq!(schema.collections.len(), 2);

        let bars = &schema.collections["bars"];
        assert_eq!(bars.required, vec!["name".to_string()]);
        assert_eq!(bars.properties["name"].field_type, Some(FieldType::String));

        let events = &schema.collections["events"];
        assert!(matches!(
            events.collection_path("events"),
            CollectionPath::Nested { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = SchemaLoader::load(&temp_dir.path().join("nope.json"));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = SchemaLoader::parse("inline", "{ not json");
        assert!(matches!(result, Err(SchemaError::Malformed { .. })));
    }

    #[test]
    fn test_uncompilable_pattern_is_malformed() {
        let content = r#"{"collections": {"bars": {"properties": {"name": {"type": "string", "pattern": "["}}}}}"#;
        let result = SchemaLoader::parse("inline", content);
        assert!(matches!(result, Err(SchemaError::Malformed { .. })));
    }
}
