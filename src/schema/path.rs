//! Collection path shapes
//!
//! - `bars` is a top-level collection
//! - `bars/{barId}/events` (optionally ending in `/{eventId}`) is a
//!   subcollection nested one level under `bars`
//!
//! Deeper nesting is not audited.

/// Parsed store path of a schema collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionPath {
    /// Plain collection, fetched directly
    TopLevel { name: String },
    /// Collection under every document of `parent`
    Nested {
        parent: String,
        parent_param: String,
        child: String,
    },
    /// A parameterized path this auditor cannot walk
    Unsupported { path: String },
}

impl CollectionPath {
    pub fn parse(path: &str) -> Self {
        if !path.contains('{') {
            return CollectionPath::TopLevel {
                name: path.to_string(),
            };
        }

        let segments: Vec<&str> = path.split('/').collect();
        let nested = match segments.as_slice() {
            [parent, param, child] => Some((parent, param, child)),
            [parent, param, child, doc] if is_param(doc) => Some((parent, param, child)),
            _ => None,
        };

        match nested {
            Some((parent, param, child))
                if is_param(param) && !is_param(parent) && !is_param(child) =>
            {
                CollectionPath::Nested {
                    parent: parent.to_string(),
                    parent_param: param[1..param.len() - 1].to_string(),
                    child: child.to_string(),
                }
            }
            _ => CollectionPath::Unsupported {
                path: path.to_string(),
            },
        }
    }

    /// Path recorded in reports for documents of this collection
    pub fn display_path(&self) -> String {
        match self {
            CollectionPath::TopLevel { name } => name.clone(),
            CollectionPath::Nested {
                parent,
                parent_param,
                child,
            } => format!("{}/{{{}}}/{}", parent, parent_param, child),
            CollectionPath::Unsupported { path } => path.clone(),
        }
    }
}

fn is_param(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Name of the root collection of a path: everything before the first `/`.
pub fn top_level_name(collection_path: &str) -> &str {
    collection_path
        .split('/')
        .next()
        .unwrap_or(collection_path)
}
