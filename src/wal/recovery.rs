//! WAL Recovery
//!
//! Reads a WAL after a crash and repairs an interrupted final append.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::Result;
use super::{WalEntry, WalReader};

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Last valid LSN (0 for an empty log)
    pub last_lsn: u64,

    /// Whether an incomplete final line was found
    pub was_truncated: bool,

    /// Bytes belonging to the incomplete final line
    pub bytes_truncated: u64,
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Read all complete entries in order
    /// 2. Fail on any corrupted complete line (nothing is skipped)
    /// 3. Truncate an incomplete final line, which was never acknowledged
    /// 4. Return the entries in append order
    ///
    /// A missing file recovers as an empty log.
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        if !path.exists() {
            return Ok((Vec::new(), RecoveryResult::default()));
        }

        let (entries, result) = Self::scan(path)?;

        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(file.metadata()?.len() - result.bytes_truncated)?;
            file.sync_all()?;

            tracing::warn!(
                path = %path.display(),
                bytes = result.bytes_truncated,
                "Truncated incomplete WAL tail"
            );
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        if !path.exists() {
            return Ok(RecoveryResult::default());
        }
        Self::scan(path).map(|(_, result)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let file_len = std::fs::metadata(path)?.len();

        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry()? {
            entries.push(entry);
        }

        let was_truncated = reader.torn_tail().is_some();
        let result = RecoveryResult {
            entries_recovered: entries.len() as u64,
            last_lsn: reader.last_lsn(),
            was_truncated,
            bytes_truncated: if was_truncated {
                file_len - reader.valid_len()
            } else {
                0
            },
        };

        Ok((entries, result))
    }
}
