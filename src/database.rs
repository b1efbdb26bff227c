//! Database Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Own the table name → table mapping
//! - Log every mutation to the WAL before applying it
//! - Load the snapshot on startup, write it at checkpoint
//! - Replay the WAL during recovery

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::error::{Result, TabulaError};
use crate::snapshot::{SnapshotStore, SnapshotView, TableView};
use crate::table::{Record, Selector, Table};
use crate::wal::{Operation, WalEntry, WalWriter};

/// Whether a mutation is new (must be logged) or comes from the WAL itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logging {
    Durable,
    Replay,
}

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **Mapping** (`tables`): one `RwLock`, write mode for create/drop, read
///   mode for lookup/list. It guards which tables exist, never their rows.
/// - **Rows**: each [`Table`] has its own `RwLock`. Insert/update/delete hold
///   it in write mode across WAL append + apply, so log order matches apply
///   order per table. Select holds it in read mode.
/// - **WAL**: a `Mutex`, taken last. Lock order is always
///   mapping → table → WAL.
///
/// A row operation resolves the table under the mapping read lock, releases
/// it, then locks the table. A concurrent drop can land in between; the
/// operation then sees the table's dropped flag and fails with
/// `TableNotFound` without logging anything.
///
/// ## Unreplayed WAL
///
/// [`Database::open`] does not replay the WAL. If the log holds entries past
/// the snapshot, the in-memory state is behind the log: every mutation and
/// [`Database::checkpoint`] is refused with `UnappliedWal` until the database
/// is opened through [`Database::recover`]. Reads still work.
pub struct Database {
    /// Database configuration
    config: Config,

    /// Table name → table
    tables: RwLock<HashMap<String, Arc<Table>>>,

    /// Write-ahead log (exclusive access needed)
    wal: Mutex<WalWriter>,

    /// Encrypted snapshot file
    snapshots: SnapshotStore,

    /// Highest LSN already contained in the loaded snapshot
    checkpoint_lsn: u64,

    /// Last WAL LSN whose entry is not reflected in memory, if any
    unapplied_lsn: Option<u64>,
}

impl Database {
    /// Open or create a database with the given config
    ///
    /// On startup:
    /// 1. Load the snapshot (absent file = clean database)
    /// 2. Open/create the WAL in append mode
    ///
    /// The WAL is not replayed here; see [`Database::recover`]. It is still
    /// scanned in full, so a corrupt log fails `open` as well.
    pub fn open(config: Config) -> Result<Self> {
        if config.uses_fallback_key() {
            tracing::warn!(
                "No encryption key configured, using the built-in fallback key. \
                 Snapshots are NOT protected; set SEC_KEY."
            );
        }

        let snapshots = SnapshotStore::new(&config.snapshot_path, &config.encryption_key);

        let (tables, checkpoint_lsn) = match snapshots.load()? {
            Some(image) => {
                tracing::info!("Starting session with an existing database");
                let tables = image
                    .tables
                    .into_iter()
                    .map(|(name, t)| {
                        let table = Table::with_records(name.clone(), t.columns, t.records);
                        (name, Arc::new(table))
                    })
                    .collect();
                (tables, image.last_lsn)
            }
            None => {
                tracing::info!("Starting session with a clean database");
                (HashMap::new(), 0)
            }
        };

        let mut wal = WalWriter::open(&config.wal_path)?;
        let wal_lsn = wal.current_lsn() - 1;
        let unapplied_lsn = (wal_lsn > checkpoint_lsn).then_some(wal_lsn);
        if let Some(wal_lsn) = unapplied_lsn {
            tracing::warn!(
                checkpoint_lsn,
                wal_lsn,
                "WAL has entries past the snapshot; database is read-only until recovered"
            );
        }
        wal.resume_after(checkpoint_lsn);

        Ok(Self {
            config,
            tables: RwLock::new(tables),
            wal: Mutex::new(wal),
            snapshots,
            checkpoint_lsn,
            unapplied_lsn,
        })
    }

    /// Open the database and replay every WAL entry written after the
    /// last snapshot
    ///
    /// Any entry that cannot be applied aborts recovery with its error;
    /// nothing is skipped.
    pub fn recover(config: Config) -> Result<Self> {
        let mut db = Self::open(config)?;

        let entries = db.read_wal()?;
        let total = entries.len();
        let pending: Vec<WalEntry> = entries
            .into_iter()
            .filter(|entry| entry.lsn > db.checkpoint_lsn)
            .collect();
        let skipped = total - pending.len();

        let replayed = db.replay(pending)?;
        db.unapplied_lsn = None;
        tracing::info!(
            replayed,
            skipped,
            checkpoint_lsn = db.checkpoint_lsn,
            "WAL recovery complete"
        );

        Ok(db)
    }

    /// Apply WAL entries in order without logging them again
    ///
    /// Returns the number of entries applied. Stops at the first failure.
    pub fn replay(&self, entries: impl IntoIterator<Item = WalEntry>) -> Result<usize> {
        let mut applied = 0;
        for entry in entries {
            let lsn = entry.lsn;
            if let Err(e) = self.apply(entry) {
                tracing::error!(lsn, error = %e, "WAL replay failed");
                return Err(e);
            }
            applied += 1;
        }
        Ok(applied)
    }

    fn apply(&self, entry: WalEntry) -> Result<()> {
        let name = entry.table_name.as_str();
        match entry.operation {
            Operation::Create { columns } => self.create_table_as(name, columns, Logging::Replay),
            Operation::Drop => self.drop_table_as(name, Logging::Replay),
            Operation::Insert { values } => self.insert_record_as(name, values, Logging::Replay),
            Operation::Update { updates, selector } => self
                .update_records_as(name, &updates, &selector, Logging::Replay)
                .map(|_| ()),
            Operation::Delete { selector } => self
                .delete_records_as(name, &selector, Logging::Replay)
                .map(|_| ()),
        }
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Create a new empty table
    ///
    /// Column names must be non-empty and distinct.
    pub fn create_table(&self, name: &str, columns: Vec<String>) -> Result<()> {
        self.create_table_as(name, columns, Logging::Durable)
    }

    /// Drop a table and all its rows
    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.drop_table_as(name, Logging::Durable)
    }

    /// Names of all tables, in no particular order
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    /// Resolve a table by name
    pub fn get_table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TabulaError::TableNotFound(name.to_string()))
    }

    fn create_table_as(&self, name: &str, columns: Vec<String>, mode: Logging) -> Result<()> {
        validate_columns(&columns)?;

        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(TabulaError::TableExists(name.to_string()));
        }

        self.log(mode, name, || Operation::Create {
            columns: columns.clone(),
        })?;

        tracing::debug!(table = name, columns = columns.len(), "Table created");
        tables.insert(name.to_string(), Arc::new(Table::new(name, columns)));
        Ok(())
    }

    fn drop_table_as(&self, name: &str, mode: Logging) -> Result<()> {
        let mut tables = self.tables.write();
        let table = tables
            .get(name)
            .cloned()
            .ok_or_else(|| TabulaError::TableNotFound(name.to_string()))?;

        table.mark_dropped_with(|| self.log(mode, name, || Operation::Drop))?;
        tables.remove(name);

        tracing::debug!(table = name, "Table dropped");
        Ok(())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Insert one row; values map onto the table's columns by position
    pub fn insert_record(&self, table: &str, values: Vec<String>) -> Result<()> {
        self.insert_record_as(table, values, Logging::Durable)
    }

    /// Detached copies of matching rows. Never logged.
    pub fn select_records(&self, table: &str, selector: &Selector) -> Result<Vec<Record>> {
        Ok(self.get_table(table)?.select(selector))
    }

    /// Overwrite existing columns on matching rows; returns rows matched
    pub fn update_records(
        &self,
        table: &str,
        updates: &BTreeMap<String, String>,
        selector: &Selector,
    ) -> Result<usize> {
        self.update_records_as(table, updates, selector, Logging::Durable)
    }

    /// Remove matching rows; returns rows removed
    pub fn delete_records(&self, table: &str, selector: &Selector) -> Result<usize> {
        self.delete_records_as(table, selector, Logging::Durable)
    }

    fn insert_record_as(&self, name: &str, values: Vec<String>, mode: Logging) -> Result<()> {
        let table = self.get_table(name)?;
        table.insert_with(values, |values| {
            self.log(mode, name, || Operation::Insert {
                values: values.to_vec(),
            })
        })
    }

    fn update_records_as(
        &self,
        name: &str,
        updates: &BTreeMap<String, String>,
        selector: &Selector,
        mode: Logging,
    ) -> Result<usize> {
        let table = self.get_table(name)?;
        table.update_with(updates, selector, || {
            self.log(mode, name, || Operation::Update {
                updates: updates.clone(),
                selector: selector.clone(),
            })
        })
    }

    fn delete_records_as(&self, name: &str, selector: &Selector, mode: Logging) -> Result<usize> {
        let table = self.get_table(name)?;
        table.delete_with(selector, || {
            self.log(mode, name, || Operation::Delete {
                selector: selector.clone(),
            })
        })
    }

    /// Append the operation to the WAL (durable mode only)
    ///
    /// Any failure is wrapped in `DurabilityFailure`; the caller must not
    /// apply the mutation.
    fn log<F>(&self, mode: Logging, table: &str, operation: F) -> Result<()>
    where
        F: FnOnce() -> Operation,
    {
        if mode == Logging::Replay {
            return Ok(());
        }
        self.ensure_current().map_err(TabulaError::durability)?;

        let mut wal = self.wal.lock();
        let entry = wal
            .append(table, operation())
            .map_err(TabulaError::durability)?;

        tracing::debug!(
            lsn = entry.lsn,
            table,
            operation = entry.operation.kind(),
            "WAL append"
        );
        Ok(())
    }

    // =========================================================================
    // Checkpoint / Shutdown
    // =========================================================================

    /// Write the snapshot, then truncate and close the WAL
    ///
    /// Holds the mapping lock and every table's read lock for the duration,
    /// so no mutation can slip in between the encoded state and the WAL
    /// truncation. Afterwards every mutation fails with `DurabilityFailure`.
    /// If the snapshot cannot be written the WAL is left open and intact.
    ///
    /// Refused with `UnappliedWal` while the WAL holds entries that were never
    /// replayed; truncating it would discard them.
    pub fn checkpoint(&self) -> Result<()> {
        self.ensure_current()?;

        let tables = self.tables.read();
        let guards: Vec<_> = tables
            .iter()
            .map(|(name, table)| (name.as_str(), table.column_names(), table.read_records()))
            .collect();

        let mut wal = self.wal.lock();
        if !wal.is_open() {
            return Err(TabulaError::WalClosed);
        }

        let view = SnapshotView {
            last_lsn: wal.current_lsn() - 1,
            tables: guards
                .iter()
                .map(|(name, columns, records)| {
                    (
                        *name,
                        TableView {
                            columns,
                            records: &records[..],
                        },
                    )
                })
                .collect(),
        };

        self.snapshots.save(&view)?;
        wal.truncate()?;
        wal.close()?;

        tracing::info!(last_lsn = view.last_lsn, "Checkpoint complete, WAL closed");
        Ok(())
    }

    fn ensure_current(&self) -> Result<()> {
        match self.unapplied_lsn {
            Some(wal_lsn) => Err(TabulaError::UnappliedWal {
                applied_lsn: self.checkpoint_lsn,
                wal_lsn,
            }),
            None => Ok(()),
        }
    }

    /// Close the database gracefully (checkpoint on shutdown)
    pub fn close(self) -> Result<()> {
        self.checkpoint()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Rescan the WAL from the beginning
    pub fn read_wal(&self) -> Result<Vec<WalEntry>> {
        self.wal.lock().read_all()
    }

    /// Whether the WAL still accepts appends
    pub fn is_wal_open(&self) -> bool {
        self.wal.lock().is_open()
    }

    /// Highest LSN covered by the snapshot this database was loaded from
    pub fn checkpoint_lsn(&self) -> u64 {
        self.checkpoint_lsn
    }

    /// Last WAL LSN not reflected in memory (opened without recovery)
    pub fn unapplied_lsn(&self) -> Option<u64> {
        self.unapplied_lsn
    }

    /// Get the number of tables
    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn validate_columns(columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(TabulaError::InvalidSchema(
            "a table needs at least one column".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(TabulaError::InvalidSchema(format!(
                "duplicate column '{}'",
                column
            )));
        }
    }
    Ok(())
}
