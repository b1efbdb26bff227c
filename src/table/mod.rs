//! Table Module
//!
//! In-memory row storage for a single table.
//!
//! ## Responsibilities
//! - Fixed column list, set at creation
//! - Ordered record sequence (insertion order)
//! - Per-table multi-reader/single-writer access
//! - Positional insert, selector-based select/update/delete
//!
//! ## Concurrency
//! Each table owns its own `RwLock`, so work on one table never blocks
//! another. Mutations take the write lock, selects the read lock.
//!
//! Every mutation has a `*_with` variant that runs a hook after validation,
//! while the write lock is held, and before anything is changed. The database
//! uses it to append the WAL entry: if the hook fails, nothing is applied.

mod record;
mod selector;

pub use record::Record;
pub use selector::Selector;

use std::collections::BTreeMap;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use crate::error::{Result, TabulaError};

/// Guarded table contents
#[derive(Debug, Default)]
struct TableState {
    records: Vec<Record>,

    /// Set once the table has been removed from its database. A detached
    /// table rejects mutations so nothing is logged against a dropped name.
    dropped: bool,
}

/// A named table with a fixed column list
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    state: RwLock<TableState>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self::with_records(name, columns, Vec::new())
    }

    /// Create a table pre-filled with records (snapshot load)
    pub(crate) fn with_records(
        name: impl Into<String>,
        columns: Vec<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            state: RwLock::new(TableState {
                records,
                dropped: false,
            }),
        }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared columns (owned copy)
    pub fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    /// Declared columns, borrowed. Columns never change after creation.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Number of records currently stored
    pub fn record_count(&self) -> usize {
        self.state.read().records.len()
    }

    /// Detached copies of every record matching `selector`, in storage order
    pub fn select(&self, selector: &Selector) -> Vec<Record> {
        let state = self.state.read();
        state
            .records
            .iter()
            .filter(|record| selector.matches(record))
            .cloned()
            .collect()
    }

    /// True once the table has been dropped from its database
    pub fn is_dropped(&self) -> bool {
        self.state.read().dropped
    }

    /// Hold the read lock and borrow the records (checkpoint encoding)
    pub(crate) fn read_records(&self) -> MappedRwLockReadGuard<'_, [Record]> {
        RwLockReadGuard::map(self.state.read(), |state| state.records.as_slice())
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Insert one row; values are matched to columns by position
    pub fn insert(&self, values: Vec<String>) -> Result<()> {
        self.insert_with(values, |_| Ok(()))
    }

    /// Update matching rows, returning how many rows matched
    ///
    /// Only columns that already exist on a row are written; unknown columns
    /// are ignored. A row counts as matched even if `updates` is empty.
    pub fn update(&self, updates: &BTreeMap<String, String>, selector: &Selector) -> Result<usize> {
        self.update_with(updates, selector, || Ok(()))
    }

    /// Remove matching rows, keeping survivors in order. Returns rows removed.
    pub fn delete(&self, selector: &Selector) -> Result<usize> {
        self.delete_with(selector, || Ok(()))
    }

    /// `before_apply` sees the validated values
    pub(crate) fn insert_with<F>(&self, values: Vec<String>, before_apply: F) -> Result<()>
    where
        F: FnOnce(&[String]) -> Result<()>,
    {
        let mut state = self.state.write();
        self.ensure_attached(&state)?;

        if values.len() != self.columns.len() {
            return Err(TabulaError::SchemaMismatch {
                expected: self.columns.len(),
                got: values.len(),
            });
        }

        before_apply(&values)?;

        let record: Record = self.columns.iter().cloned().zip(values).collect();
        state.records.push(record);
        Ok(())
    }

    pub(crate) fn update_with<F>(
        &self,
        updates: &BTreeMap<String, String>,
        selector: &Selector,
        before_apply: F,
    ) -> Result<usize>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut state = self.state.write();
        self.ensure_attached(&state)?;

        before_apply()?;

        let mut matched = 0;
        for record in state.records.iter_mut().filter(|r| selector.matches(r)) {
            for (column, value) in updates {
                record.overwrite(column, value);
            }
            matched += 1;
        }
        Ok(matched)
    }

    pub(crate) fn delete_with<F>(&self, selector: &Selector, before_apply: F) -> Result<usize>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut state = self.state.write();
        self.ensure_attached(&state)?;

        before_apply()?;

        let before = state.records.len();
        state.records.retain(|record| !selector.matches(record));
        Ok(before - state.records.len())
    }

    /// Detach the table from its database
    ///
    /// Runs `before_apply` (the drop's WAL append) under the write lock, so
    /// any mutation that got the lock first is logged before the drop, and
    /// any that gets it later sees the flag and is rejected.
    pub(crate) fn mark_dropped_with<F>(&self, before_apply: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut state = self.state.write();
        self.ensure_attached(&state)?;

        before_apply()?;

        state.dropped = true;
        Ok(())
    }

    fn ensure_attached(&self, state: &TableState) -> Result<()> {
        if state.dropped {
            return Err(TabulaError::TableNotFound(self.name.clone()));
        }
        Ok(())
    }
}
