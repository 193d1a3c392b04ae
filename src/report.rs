//! Recoverable-issue reporting.
//!
//! Warnings are the channel for everything that is skipped or downgraded
//! rather than failed: unparseable DDL statements, indexes on unknown tables,
//! incompatible rendering options. The command layer decides where they go
//! (stderr); the pipeline itself never prints.

use serde::Serialize;
use std::fmt;

/// A recoverable issue encountered while extracting or assembling.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub code: &'static str,
    pub message: String,
}

impl Warning {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Print warnings to stderr, one per line. No output when empty.
pub fn report_warnings(warnings: &[Warning]) {
    for w in warnings {
        eprintln!("warning: {}", w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = Warning::new("skipped-statement", "CREATE TABLE with no columns");
        assert_eq!(
            w.to_string(),
            "[skipped-statement] CREATE TABLE with no columns"
        );
    }
}
