//! Declarative document schemas
//!
//! A schema maps collection names to the fields their documents must (or
//! may) carry. Schemas are loaded once per run and never mutated.

mod errors;
mod loader;
mod path;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::SchemaLoader;
pub use path::{top_level_name, CollectionPath};
pub use types::{CollectionSchema, CustomRuleSpec, FieldPattern, FieldSchema, FieldType, Schema};
