//! docaudit - schema audits for hierarchical document stores
//!
//! Validates every document of the collections declared in a JSON schema,
//! optionally writes schema defaults back, and produces a JSON report.

pub mod audit;
pub mod cli;
pub mod document;
pub mod observability;
pub mod schema;
pub mod store;
pub mod validator;
