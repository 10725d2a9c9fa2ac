//! Run options

use serde::Serialize;

/// Default per-collection fetch cap
pub const DEFAULT_LIMIT: usize = 1000;

/// Options of one audit run, as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditOptions {
    /// Write schema defaults into documents missing required fields
    pub fix: bool,
    /// Never write to the store, even with `fix`
    pub report_only: bool,
    /// Documents fetched per top-level collection; 0 = unlimited
    pub limit: usize,
    /// Parent documents enumerated per subcollection; 0 = unlimited
    pub parent_limit: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            fix: false,
            report_only: false,
            limit: DEFAULT_LIMIT,
            parent_limit: 0,
        }
    }
}

impl AuditOptions {
    /// True when fixes are written to the store
    pub fn fix_enabled(&self) -> bool {
        self.fix && !self.report_only
    }

    pub fn fetch_limit(&self) -> Option<usize> {
        non_zero(self.limit)
    }

    pub fn parent_fetch_limit(&self) -> Option<usize> {
        non_zero(self.parent_limit)
    }
}

fn non_zero(limit: usize) -> Option<usize> {
    (limit > 0).then_some(limit)
}
