//! Record implementation
//!
//! A single row: column name → string value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single row in a table
///
/// The record itself does not enforce a schema; only [`Table`](super::Table)
/// does, when the record is built. Cloning is a deep copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for a column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Insert or overwrite a column value
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Remove a column, returning its old value
    pub fn delete(&mut self, column: &str) -> Option<String> {
        self.fields.remove(column)
    }

    /// True if the record has a value for `column`
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Column names present on this record
    ///
    /// Callers must not rely on the order; sort if stable output matters.
    pub fn columns(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Values present on this record, in the same order as [`columns`](Self::columns)
    pub fn values(&self) -> Vec<String> {
        self.fields.values().cloned().collect()
    }

    /// Number of columns set
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no column is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(column, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overwrite `column` only if it is already present
    ///
    /// Returns whether a value was written.
    pub(crate) fn overwrite(&mut self, column: &str, value: &str) -> bool {
        match self.fields.get_mut(column) {
            Some(slot) => {
                value.clone_into(slot);
                true
            }
            None => false,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
