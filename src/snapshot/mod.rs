//! Snapshot Module
//!
//! Encrypted at-rest copy of every table, written at checkpoint and read on
//! startup.
//!
//! ## Responsibilities
//! - Canonical encoding of the name → table mapping (bincode, ordered maps)
//! - AES-256-GCM sealing keyed from the configured secret
//! - Replace the snapshot file atomically (temp file + fsync + rename)
//! - Treat an absent file as an empty database, anything unreadable as corrupt

mod cipher;
mod format;

pub use cipher::{SnapshotCipher, KEY_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE};
pub use format::{SnapshotImage, SnapshotView, TableImage, TableView, HEADER_SIZE, MAGIC, VERSION};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Reads and writes the snapshot file
pub struct SnapshotStore {
    path: PathBuf,
    secret: String,
}

impl SnapshotStore {
    /// Create a store for `path`, sealing with `secret`
    pub fn new(path: impl Into<PathBuf>, secret: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            secret: secret.into(),
        }
    }

    /// Encode, encrypt, and atomically replace the snapshot file
    ///
    /// Either the new snapshot is fully in place or the previous file is left
    /// untouched. Returns the number of bytes written.
    pub fn save(&self, view: &SnapshotView<'_>) -> Result<u64> {
        let bytes = format::encode(view, &self.secret)?;
        write_atomic(&self.path, &bytes)?;

        tracing::info!(
            path = %self.path.display(),
            tables = view.tables.len(),
            bytes = bytes.len(),
            "Snapshot saved"
        );
        Ok(bytes.len() as u64)
    }

    /// Load the snapshot
    ///
    /// Returns `Ok(None)` if the file does not exist. Decryption or decoding
    /// failures are `SnapshotCorrupt`.
    pub fn load(&self) -> Result<Option<SnapshotImage>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let image = format::decode(&bytes, &self.secret)?;
        tracing::info!(
            path = %self.path.display(),
            tables = image.tables.len(),
            last_lsn = image.last_lsn,
            "Snapshot loaded"
        );
        Ok(Some(image))
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `bytes` to a sibling temp file, sync it, then rename over `path`
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir)?;
    }

    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Some(dir) = dir {
        sync_dir(dir)?;
    }

    Ok(())
}

/// Persist a new or renamed entry inside `dir`
#[cfg(unix)]
pub(crate) fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub(crate) fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
