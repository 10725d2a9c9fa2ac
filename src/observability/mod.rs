//! Observability for audit runs
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here changes what gets audited.
//!
//! ```ignore
//! use docaudit::observability::{log_event_with_fields, AuditEvent};
//!
//! log_event_with_fields(AuditEvent::CollectionBegin, &[("collection", "bars")]);
//! ```

mod events;
mod logger;

pub use events::AuditEvent;
pub use logger::{Logger, Severity};

/// Severity an event is logged at
pub fn event_severity(event: AuditEvent) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: AuditEvent, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
