//! Document validation against collection schemas
//!
//! - Type checking of dynamic values
//! - Per-field constraints, recursing into nested objects
//! - Named cross-field rules
//!
//! Validation is pure: no I/O, no mutation, deterministic output order.

mod field;
mod rules;
mod typecheck;
mod violation;

pub use field::validate_field;
pub use rules::{CustomRule, FieldOrderRule, RuleRegistry, END_AT_AFTER_START_AT};
pub use typecheck::is_valid_type;
pub use violation::{Violation, ViolationKind, ViolationSeverity};
