//! Row selectors
//!
//! Structured predicates used both for in-memory filtering and for the WAL,
//! so update/delete entries can be replayed exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Record;

/// Which rows an operation applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// Every row
    #[default]
    All,

    /// Rows whose `column` holds exactly `value`.
    /// A row without that column never matches.
    Equals { column: String, value: String },
}

impl Selector {
    /// Build an equality selector
    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Selector::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Test a record against this selector
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Selector::All => true,
            Selector::Equals { column, value } => record.get(column) == Some(value.as_str()),
        }
    }
}

impl From<Option<(String, String)>> for Selector {
    fn from(condition: Option<(String, String)>) -> Self {
        match condition {
            Some((column, value)) => Selector::Equals { column, value },
            None => Selector::All,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => write!(f, "*"),
            Selector::Equals { column, value } => write!(f, "{}={}", column, value),
        }
    }
}
