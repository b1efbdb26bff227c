//! WAL Writer
//!
//! Handles appending entries to the WAL file.
//!
//! States: Open (file handle held) → Closed (after [`WalWriter::close`]).
//! Every append is synced to stable storage before it returns.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, TabulaError};
use crate::snapshot::sync_dir;
use super::entry::now_millis;
use super::{Operation, WalEntry, WalReader, WalRecovery};

/// Writes entries to the WAL file
pub struct WalWriter {
    /// Location of the log, kept for rescans
    path: PathBuf,

    /// `None` once closed
    file: Option<File>,

    /// LSN the next append will get
    next_lsn: u64,

    /// Latest `created_at` handed out, keeps timestamps non-decreasing
    last_timestamp: u64,

    /// Current file length, to roll back a failed append
    len: u64,
}

impl WalWriter {
    /// Open or create a WAL file in append mode
    ///
    /// An incomplete final line left by a crash is truncated first, so new
    /// entries never get glued onto it. LSNs continue after the last entry.
    ///
    /// The whole log is scanned to find that entry: a corrupt line or an
    /// unknown operation fails `open` with the same error recovery would
    /// report, whether or not the caller intends to replay.
    pub fn open(path: &Path) -> Result<Self> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }

        let (_, recovered) = WalRecovery::recover(path)?;

        let created = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let len = file.metadata()?.len();

        // New directory entry must survive a crash too
        if created {
            file.sync_all()?;
            if let Some(parent) = parent {
                sync_dir(parent)?;
            }
        }

        tracing::debug!(
            path = %path.display(),
            entries = recovered.entries_recovered,
            last_lsn = recovered.last_lsn,
            "WAL opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            next_lsn: recovered.last_lsn + 1,
            last_timestamp: 0,
            len,
        })
    }

    /// Make sure the next LSN is greater than `lsn`
    ///
    /// Used after loading a snapshot that already covers LSNs up to `lsn`.
    pub fn resume_after(&mut self, lsn: u64) {
        self.next_lsn = self.next_lsn.max(lsn + 1);
    }

    /// Append an entry to the WAL
    ///
    /// Assigns the LSN and timestamp, writes one line, and syncs. Returns the
    /// entry exactly as written. On failure the file is rolled back to its
    /// previous length. If that rollback fails too, the writer closes itself:
    /// a later line appended after the partial bytes would be unreadable.
    pub fn append(&mut self, table_name: &str, operation: Operation) -> Result<WalEntry> {
        let file = self.file.as_mut().ok_or(TabulaError::WalClosed)?;

        let created_at = now_millis().max(self.last_timestamp);
        let entry = WalEntry {
            lsn: self.next_lsn,
            table_name: table_name.to_string(),
            operation,
            created_at,
        };
        let line = entry.serialize()?;

        let written = file.write_all(&line).and_then(|()| file.sync_data());
        if let Err(e) = written {
            if let Err(rollback) = file.set_len(self.len) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "WAL rollback failed, closing log"
                );
                self.file = None;
            }
            return Err(TabulaError::WalWrite(e.to_string()));
        }

        self.len += line.len() as u64;
        self.next_lsn += 1;
        self.last_timestamp = created_at;
        Ok(entry)
    }

    /// Rescan the whole log from the beginning
    pub fn read_all(&self) -> Result<Vec<WalEntry>> {
        WalReader::open(&self.path)?.read_all()
    }

    /// Empty the log (checkpoint). LSNs keep counting up.
    pub fn truncate(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or(TabulaError::WalClosed)?;
        file.set_len(0)?;
        file.sync_all()?;
        self.len = 0;
        Ok(())
    }

    /// Release the file handle. Later appends fail with `WalClosed`.
    pub fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Whether the writer still holds its file
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Get the LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
