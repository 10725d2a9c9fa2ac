//! CLI-specific error types
//!
//! Every CLI error is fatal: it is logged, printed, and the process exits 1.

use std::fmt;
use std::io;

use crate::audit::AuditError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Store configuration missing or invalid
    ConfigError,
    /// Schema file missing or invalid
    SchemaError,
    /// Store could not be opened
    StoreError,
    /// Audit aborted
    AuditFailed,
    /// Console or report I/O failed
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DOCAUDIT_CLI_CONFIG_ERROR",
            Self::SchemaError => "DOCAUDIT_CLI_SCHEMA_ERROR",
            Self::StoreError => "DOCAUDIT_CLI_STORE_ERROR",
            Self::AuditFailed => "DOCAUDIT_CLI_AUDIT_FAILED",
            Self::IoError => "DOCAUDIT_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        if e.is_config() {
            Self::config_error(e.to_string())
        } else {
            Self::new(CliErrorCode::StoreError, e.to_string())
        }
    }
}

impl From<AuditError> for CliError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::ReportWrite { .. } => Self::io_error(e.to_string()),
            AuditError::Fetch { .. } => Self::new(CliErrorCode::AuditFailed, e.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let err: CliError = SchemaError::NotFound("schema.json".into()).into();
        assert_eq!(err.code(), CliErrorCode::SchemaError);

        let err: CliError = StoreError::InvalidConfig("no backend".into()).into();
        assert_eq!(err.code(), CliErrorCode::ConfigError);

        let err: CliError = AuditError::fetch("bars", StoreError::LockPoisoned).into();
        assert_eq!(err.code(), CliErrorCode::AuditFailed);
        assert!(err.to_string().starts_with("DOCAUDIT_CLI_AUDIT_FAILED: "));
    }
}
