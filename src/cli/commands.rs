//! CLI command implementation
//!
//! Run sequence:
//! 1. Schema load
//! 2. Store configuration load and connect
//! 3. Audit of every schema collection
//! 4. Report write, then console summary
//!
//! Any failure before step 4 completes is fatal and leaves no report.

use std::io::{self, Write};

use crate::audit::{run_audit, AuditReport};
use crate::observability::{log_event_with_fields, AuditEvent, Logger, Severity};
use crate::schema::SchemaLoader;
use crate::store::StoreConfig;
use crate::validator::RuleRegistry;

use super::args::Cli;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments, runs the audit and returns the process exit code.
/// Fatal errors are logged once, as `AUDIT_FAILED`, before being returned.
pub fn run() -> CliResult<i32> {
    let cli = Cli::parse_args();
    let stdout = io::stdout();
    run_command(&cli, &mut stdout.lock())
}

/// Process exit code for a finished run. Errors map to 1 and print
/// nothing: `run_command` has logged them already.
pub fn exit_code(result: CliResult<i32>) -> i32 {
    result.unwrap_or(1)
}

/// Runs one audit, printing the summary to `out`.
pub fn run_command<W: Write>(cli: &Cli, out: &mut W) -> CliResult<i32> {
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }

    match audit(cli, out) {
        Ok(code) => Ok(code),
        Err(e) => {
            log_event_with_fields(
                AuditEvent::AuditFailed,
                &[("code", e.code_str()), ("reason", e.message())],
            );
            Err(e)
        }
    }
}

fn audit<W: Write>(cli: &Cli, out: &mut W) -> CliResult<i32> {
    let schema = SchemaLoader::load(&cli.schema)?;
    let schema_path = cli.schema.display().to_string();
    let collections = schema.collections.len().to_string();
    log_event_with_fields(
        AuditEvent::SchemaLoaded,
        &[("path", schema_path.as_str()), ("collections", collections.as_str())],
    );

    let config = StoreConfig::load(&cli.config)?;
    let store = config.connect()?;
    log_event_with_fields(
        AuditEvent::StoreConnected,
        &[("backend", config.backend_name())],
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    let report = runtime.block_on(run_audit(
        &store,
        &schema,
        cli.audit_options(),
        RuleRegistry::with_builtin_rules(),
    ))?;

    report.write_to(&cli.output)?;
    log_event_with_fields(
        AuditEvent::ReportWritten,
        &[("path", cli.output.display().to_string().as_str())],
    );

    report.print_summary(out)?;
    log_completion(&report);

    Ok(report.exit_code())
}

fn log_completion(report: &AuditReport) {
    let stats = &report.statistics;
    log_event_with_fields(
        AuditEvent::AuditComplete,
        &[
            ("total", stats.total_documents.to_string().as_str()),
            ("invalid", stats.invalid_documents.to_string().as_str()),
            ("fixed", stats.fixed_documents.to_string().as_str()),
            ("errors", report.summary.error_count.to_string().as_str()),
            ("warnings", report.summary.warning_count.to_string().as_str()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(data: Value) -> Self {
            let dir = TempDir::new().unwrap();
            let schema = json!({
                "version": "1.0.0",
                "title": "Bars",
                "collections": {
                    "bars": {
                        "path": "bars",
                        "required": ["name"],
                        "properties": {"name": {"type": "string", "default": "Untitled"}}
                    }
                }
            });
            fs::write(dir.path().join("schema.json"), schema.to_string()).unwrap();
            fs::write(dir.path().join("export.json"), data.to_string()).unwrap();
            fs::write(
                dir.path().join("docaudit.json"),
                json!({"backend": "file", "dataFile": "export.json"}).to_string(),
            )
            .unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn cli(&self, extra: &[&str]) -> Cli {
            let mut args = vec![
                "docaudit".to_string(),
                "--schema".to_string(),
                self.path("schema.json").display().to_string(),
                "--config".to_string(),
                self.path("docaudit.json").display().to_string(),
                "--output".to_string(),
                self.path("audit-report.json").display().to_string(),
            ];
            args.extend(extra.iter().map(|s| s.to_string()));
            <Cli as clap::Parser>::try_parse_from(args).unwrap()
        }

        fn report(&self) -> Value {
            serde_json::from_str(&fs::read_to_string(self.path("audit-report.json")).unwrap())
                .unwrap()
        }
    }

    #[test]
    fn test_clean_store_exits_zero() {
        let fx = Fixture::new(json!({"bars": {"b1": {"name": "Boteco"}}}));
        let mut out = Vec::new();

        let code = run_command(&fx.cli(&[]), &mut out).unwrap();

        assert_eq!(code, 0);
        assert_eq!(fx.report()["statistics"]["validDocuments"], 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("AUDIT SUMMARY"));
        assert!(!text.contains("\"event\""));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(Ok(0)), 0);
        assert_eq!(exit_code(Ok(1)), 1);
        assert_eq!(exit_code(Err(CliError::config_error("missing"))), 1);
    }

    #[test]
    fn test_errors_exit_one_and_fix_persists() {
        let fx = Fixture::new(json!({"bars": {"b1": {}}}));
        let mut out = Vec::new();

        let code = run_command(&fx.cli(&["--fix"]), &mut out).unwrap();
        assert_eq!(code, 1);
        assert_eq!(fx.report()["statistics"]["fixedDocuments"], 1);

        let export: Value =
            serde_json::from_str(&fs::read_to_string(fx.path("export.json")).unwrap()).unwrap();
        assert_eq!(export["bars"]["b1"]["name"], "Untitled");
    }

    #[test]
    fn test_missing_schema_is_fatal() {
        let fx = Fixture::new(json!({}));
        fs::remove_file(fx.path("schema.json")).unwrap();

        let err = run_command(&fx.cli(&[]), &mut Vec::new()).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::SchemaError);
        assert!(!fx.path("audit-report.json").exists());
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let fx = Fixture::new(json!({}));
        fs::remove_file(fx.path("docaudit.json")).unwrap();

        let err = run_command(&fx.cli(&[]), &mut Vec::new()).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }
}
