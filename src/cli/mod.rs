//! CLI module for docaudit
//!
//! A single command: audit the configured store against a schema file,
//! write the JSON report, print a summary, and exit 0 when no
//! error-severity violation was found.

mod args;
mod commands;
mod errors;

pub use args::Cli;
pub use commands::{exit_code, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
