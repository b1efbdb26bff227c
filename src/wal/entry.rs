//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their line codec.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabulaError};
use crate::table::Selector;

/// Size of the line header: 8 hex digits of CRC32 plus one space
pub const HEADER_SIZE: usize = 9;

/// Operation kinds this version knows how to replay
pub const KNOWN_OPERATIONS: [&str; 5] = ["create", "drop", "insert", "update", "delete"];

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// Table the operation targets
    pub table_name: String,

    /// The operation to perform
    #[serde(flatten)]
    pub operation: Operation,

    /// Timestamp (unix millis) assigned by the writer
    pub created_at: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    /// Create a table with the given columns
    Create { columns: Vec<String> },

    /// Drop a table and all its rows
    Drop,

    /// Insert one row, values positional
    Insert { values: Vec<String> },

    /// Overwrite existing columns on matching rows
    Update {
        updates: BTreeMap<String, String>,
        selector: Selector,
    },

    /// Remove matching rows
    Delete { selector: Selector },
}

impl Operation {
    /// Tag written to the `operation` field
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Create { .. } => "create",
            Operation::Drop => "drop",
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, table_name: impl Into<String>, operation: Operation) -> Self {
        Self {
            lsn,
            table_name: table_name.into(),
            operation,
            created_at: now_millis(),
        }
    }

    /// Serialize to one WAL line (including the trailing newline)
    ///
    /// Format: `crc32 (8 hex) | ' ' | json | '\n'`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)
            .map_err(|e| TabulaError::Serialization(e.to_string()))?;
        let crc = crc32fast::hash(&json);

        let mut line = Vec::with_capacity(HEADER_SIZE + json.len() + 1);
        line.extend_from_slice(format!("{:08x} ", crc).as_bytes());
        line.extend_from_slice(&json);
        line.push(b'\n');
        Ok(line)
    }

    /// Deserialize a single line as if it were the first line of a log
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Self::decode_line(bytes, 1, 0)
    }

    /// CRC32 of the JSON body
    pub fn compute_crc(&self) -> Result<u32> {
        let json = serde_json::to_vec(self)
            .map_err(|e| TabulaError::Serialization(e.to_string()))?;
        Ok(crc32fast::hash(&json))
    }

    /// Decode one line; `line` (1-based) and `offset` only feed error messages
    pub(crate) fn decode_line(bytes: &[u8], line: usize, offset: u64) -> Result<Self> {
        let corrupt = |reason: String| TabulaError::WalCorrupt {
            line,
            offset,
            reason,
        };

        let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        if bytes.len() < HEADER_SIZE {
            return Err(corrupt(format!(
                "line too short: {} bytes (header is {})",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        let (header, json) = bytes.split_at(HEADER_SIZE);
        if header[8] != b' ' {
            return Err(corrupt("missing header separator".to_string()));
        }
        let stored_crc = std::str::from_utf8(&header[..8])
            .ok()
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .ok_or_else(|| corrupt("invalid checksum field".to_string()))?;

        let computed_crc = crc32fast::hash(json);
        if stored_crc != computed_crc {
            return Err(corrupt(format!(
                "CRC mismatch: stored {:08x}, computed {:08x}",
                stored_crc, computed_crc
            )));
        }

        serde_json::from_slice::<WalEntry>(json).map_err(|e| {
            match unknown_operation(json) {
                Some(operation) => TabulaError::UnsupportedWalOperation { operation, line },
                None => corrupt(e.to_string()),
            }
        })
    }
}

/// If `json` is an object whose `operation` tag is not a known kind, return it
fn unknown_operation(json: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(json).ok()?;
    let operation = value.get("operation")?.as_str()?;
    if KNOWN_OPERATIONS.contains(&operation) {
        None
    } else {
        Some(operation.to_string())
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
