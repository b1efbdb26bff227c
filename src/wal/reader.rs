//! WAL Reader
//!
//! Handles reading entries from the WAL file, one line at a time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, TabulaError};
use super::WalEntry;

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,

    /// Scratch buffer reused across lines
    buf: Vec<u8>,

    /// Lines decoded so far (1-based number of the last one)
    line: usize,

    /// Byte offset just past the last complete line
    valid_len: u64,

    /// LSN of the last decoded entry
    last_lsn: u64,

    /// Offset of an unterminated final line, if one was found
    torn_tail: Option<u64>,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            buf: Vec::new(),
            line: 0,
            valid_len: 0,
            last_lsn: 0,
            torn_tail: None,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at end of file. A final line without its newline is
    /// a write that never completed: it is not decoded, [`torn_tail`](Self::torn_tail)
    /// reports its offset, and reading stops.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        if self.torn_tail.is_some() {
            return Ok(None);
        }

        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() != Some(&b'\n') {
            tracing::warn!(
                offset = self.valid_len,
                bytes = n,
                "WAL ends with an incomplete line"
            );
            self.torn_tail = Some(self.valid_len);
            return Ok(None);
        }

        self.line += 1;
        let offset = self.valid_len;
        let entry = WalEntry::decode_line(&self.buf, self.line, offset)?;

        if entry.lsn <= self.last_lsn {
            return Err(TabulaError::WalCorrupt {
                line: self.line,
                offset,
                reason: format!(
                    "LSN {} does not follow previous LSN {}",
                    entry.lsn, self.last_lsn
                ),
            });
        }

        self.last_lsn = entry.lsn;
        self.valid_len += n as u64;
        Ok(Some(entry))
    }

    /// Read every remaining entry, in file order
    pub fn read_all(mut self) -> Result<Vec<WalEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Byte length of the well-formed prefix read so far
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }

    /// LSN of the last entry read (0 if none)
    pub fn last_lsn(&self) -> u64 {
        self.last_lsn
    }

    /// Offset of the incomplete final line, if reading stopped on one
    pub fn torn_tail(&self) -> Option<u64> {
        self.torn_tail
    }
}

/// Iterator over WAL entries
///
/// Yields each entry in order; stops after the first error.
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
