//! Audit report
//!
//! Persisted as pretty-printed JSON:
//!
//! ```json
//! {
//!   "timestamp": "...",
//!   "schema": {"version": .., "title": ..},
//!   "options": {"fix": .., "reportOnly": .., "limit": .., "parentLimit": ..},
//!   "statistics": {..},
//!   "issues": [{"document", "documentId", "collection", "issues", "data", "context"}],
//!   "summary": {"totalIssues": .., "errorCount": .., "warningCount": ..}
//! }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, FieldMap, FieldValue};
use crate::schema::Schema;
use crate::validator::{Violation, ViolationSeverity};

use super::errors::{AuditError, AuditResult};
use super::options::AuditOptions;
use super::stats::AuditStats;

/// Field names whose values never reach the report
pub const SENSITIVE_FIELDS: [&str; 4] = ["password", "token", "secret", "key"];

/// Replacement for redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Copies a document's fields, redacting sensitive top-level fields.
///
/// Matching is by exact name; nested maps are copied unchanged.
pub fn sanitize_data(fields: &FieldMap) -> FieldMap {
    let mut sanitized = fields.clone();
    for name in SENSITIVE_FIELDS {
        if let Some(value) = sanitized.get_mut(name) {
            *value = FieldValue::from(REDACTED);
        }
    }
    sanitized
}

/// Where an audited document lives relative to its parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Report entry for one invalid document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditedDocument {
    /// Concrete document path
    pub document: String,
    pub document_id: String,
    /// Schema collection path, e.g. `bars/{barId}/events`
    pub collection: String,
    pub issues: Vec<Violation>,
    /// Redacted field snapshot
    pub data: FieldMap,
    pub context: AuditContext,
}

impl AuditedDocument {
    pub fn new(collection_path: &str, document: &Document, issues: Vec<Violation>) -> Self {
        Self {
            document: document.path().to_string(),
            document_id: document.id().to_string(),
            collection: collection_path.to_string(),
            issues,
            data: sanitize_data(document.fields()),
            context: AuditContext {
                parent_id: document.parent_id().map(str::to_string),
            },
        }
    }

    pub fn count(&self, severity: ViolationSeverity) -> u64 {
        self.issues.iter().filter(|v| v.severity == severity).count() as u64
    }
}

/// Schema identity echoed into the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaIdentity {
    pub version: Option<Value>,
    pub title: Option<String>,
}

/// Aggregate counts over every audited document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of invalid documents
    pub total_issues: u64,
    pub error_count: u64,
    pub warning_count: u64,
}

impl Summary {
    pub fn from_audited(audited: &[AuditedDocument]) -> Self {
        audited.iter().fold(Summary::default(), |acc, doc| Summary {
            total_issues: acc.total_issues + 1,
            error_count: acc.error_count + doc.count(ViolationSeverity::Error),
            warning_count: acc.warning_count + doc.count(ViolationSeverity::Warning),
        })
    }
}

/// The complete result of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub timestamp: String,
    pub schema: SchemaIdentity,
    pub options: AuditOptions,
    pub statistics: AuditStats,
    pub issues: Vec<AuditedDocument>,
    pub summary: Summary,
}

impl AuditReport {
    /// Assembles the report, stamped with the current time.
    pub fn build(
        schema: &Schema,
        options: AuditOptions,
        statistics: AuditStats,
        issues: Vec<AuditedDocument>,
    ) -> Self {
        let summary = Summary::from_audited(&issues);
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            schema: SchemaIdentity {
                version: schema.version.clone(),
                title: schema.title.clone(),
            },
            options,
            statistics,
            issues,
            summary,
        }
    }

    /// 0 when no error-severity violation was found, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.summary.error_count == 0 {
            0
        } else {
            1
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the report to `path`, replacing any previous report.
    pub fn write_to(&self, path: &Path) -> AuditResult<()> {
        let write_err = |reason: String| AuditError::ReportWrite {
            path: path.display().to_string(),
            reason,
        };

        let content = self.to_json_pretty().map_err(|e| write_err(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| write_err(e.to_string()))
    }

    /// Human-readable summary for the console.
    pub fn print_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let stats = &self.statistics;
        let show_fixed = self.options.fix;

        writeln!(out)?;
        writeln!(out, "AUDIT SUMMARY")?;
        writeln!(out, "{}", "=".repeat(50))?;
        writeln!(out, "Documents audited: {}", stats.total_documents)?;
        writeln!(out, "Valid documents:   {}", stats.valid_documents)?;
        writeln!(out, "Invalid documents: {}", stats.invalid_documents)?;
        if show_fixed {
            writeln!(out, "Fixed documents:   {}", stats.fixed_documents)?;
        }

        writeln!(out)?;
        writeln!(out, "Total issues: {}", self.summary.total_issues)?;
        writeln!(out, "  Errors:   {}", self.summary.error_count)?;
        writeln!(out, "  Warnings: {}", self.summary.warning_count)?;

        writeln!(out)?;
        writeln!(out, "By collection:")?;
        for (name, c) in &stats.collections {
            if show_fixed {
                writeln!(
                    out,
                    "  {}: {} valid, {} invalid, {} fixed",
                    name, c.valid, c.invalid, c.fixed
                )?;
            } else {
                writeln!(out, "  {}: {} valid, {} invalid", name, c.valid, c.invalid)?;
            }
        }

        writeln!(out)?;
        if self.summary.total_issues > 0 {
            writeln!(out, "Run with --fix to apply automatic fixes")?;
        } else {
            writeln!(out, "No problems found")?;
        }
        Ok(())
    }
}
