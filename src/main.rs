//! docaudit CLI entry point
//!
//! All logic is delegated to the CLI module. The exit code is the one the
//! audit reports. Fatal errors are already logged as `AUDIT_FAILED` on
//! stderr and exit 1.

use docaudit::cli;

fn main() {
    std::process::exit(cli::exit_code(cli::run()));
}
