//! Snapshot file format
//!
//! ```text
//! ┌──────────┬────────────┬───────────┬────────────┬──────────────────────┐
//! │Magic (4) │Version (2) │ Salt (16) │ Nonce (12) │ Ciphertext + Tag (16)│
//! └──────────┴────────────┴───────────┴────────────┴──────────────────────┘
//! ```
//!
//! Magic, version and salt are authenticated as associated data. The
//! plaintext is the bincode encoding of [`SnapshotImage`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabulaError};
use crate::table::Record;

use super::cipher::{SnapshotCipher, SALT_SIZE};

/// Magic bytes at the start of every snapshot
pub const MAGIC: &[u8; 4] = b"TBSN";

/// Current format version
pub const VERSION: u16 = 1;

/// Bytes before the sealed body: magic + version + salt
pub const HEADER_SIZE: usize = 4 + 2 + SALT_SIZE;

/// Borrowed view of the database, encoded without cloning any rows
#[derive(Debug, Serialize)]
pub struct SnapshotView<'a> {
    /// Highest LSN whose effect is included
    pub last_lsn: u64,
    pub tables: BTreeMap<&'a str, TableView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TableView<'a> {
    pub columns: &'a [String],
    pub records: &'a [Record],
}

/// Owned, decoded snapshot. Same layout as [`SnapshotView`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotImage {
    pub last_lsn: u64,
    pub tables: BTreeMap<String, TableImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableImage {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// Encode and seal a snapshot into the full file contents
pub fn encode(view: &SnapshotView<'_>, secret: &str) -> Result<Vec<u8>> {
    let body = bincode::serialize(view).map_err(|e| TabulaError::Serialization(e.to_string()))?;

    let salt = SnapshotCipher::generate_salt();
    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&VERSION.to_le_bytes());
    header.extend_from_slice(&salt);

    let sealed = SnapshotCipher::new(secret, &salt)?.encrypt(&body, &header)?;

    let mut out = header;
    out.extend(sealed);
    Ok(out)
}

/// Check, open and decode full file contents
pub fn decode(bytes: &[u8], secret: &str) -> Result<SnapshotImage> {
    if bytes.len() < HEADER_SIZE {
        return Err(TabulaError::SnapshotCorrupt(format!(
            "file too short: {} bytes",
            bytes.len()
        )));
    }

    let (header, sealed) = bytes.split_at(HEADER_SIZE);
    if &header[..4] != MAGIC {
        return Err(TabulaError::SnapshotCorrupt("bad magic".to_string()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != VERSION {
        return Err(TabulaError::SnapshotCorrupt(format!(
            "unsupported version {}",
            version
        )));
    }
    let salt = &header[6..];

    let body = SnapshotCipher::new(secret, salt)?.decrypt(sealed, header)?;

    bincode::deserialize(&body).map_err(|e| TabulaError::SnapshotCorrupt(e.to_string()))
}
