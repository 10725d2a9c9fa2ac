//! CLI argument definitions using clap
//!
//! docaudit [-f|--fix] [-r|--report-only] [-o|--output <path>]
//!          [-c|--config <path>] [-s|--schema <path>] [--limit <n>]
//!          [--parent-limit <n>] [-v|--verbose]

use clap::Parser;
use std::path::PathBuf;

use crate::audit::{AuditOptions, DEFAULT_LIMIT};

/// docaudit - audit a document store against a JSON schema
#[derive(Parser, Debug, Clone)]
#[command(name = "docaudit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Write schema defaults into documents missing required fields
    #[arg(short, long)]
    pub fix: bool,

    /// Audit and report without writing to the store, even with --fix
    #[arg(short, long)]
    pub report_only: bool,

    /// Path of the JSON report
    #[arg(short, long, default_value = "audit-report.json")]
    pub output: PathBuf,

    /// Path to the store configuration file
    #[arg(short, long, default_value = "./docaudit.json")]
    pub config: PathBuf,

    /// Path to the schema file
    #[arg(short, long, default_value = "schema.json")]
    pub schema: PathBuf,

    /// Documents fetched per top-level collection (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Parent documents enumerated per subcollection (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub parent_limit: usize,

    /// Also log every invalid document
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            fix: self.fix,
            report_only: self.report_only,
            limit: self.limit,
            parent_limit: self.parent_limit,
        }
    }
}
