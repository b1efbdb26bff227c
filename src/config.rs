//! Configuration for TabulaDB
//!
//! Centralized configuration with sensible defaults. The database never reads
//! process-wide state on its own: everything it needs is passed in here.

use std::env;
use std::path::PathBuf;

/// Fallback key used when no secret is configured.
///
/// This is NOT a secret. Snapshots sealed with it are readable by anyone who
/// has this source code. It exists so a fresh checkout works out of the box.
pub const DEFAULT_ENCRYPTION_KEY: &str = "default";

/// Environment variable holding the snapshot encryption key
pub const ENV_ENCRYPTION_KEY: &str = "SEC_KEY";

/// Environment variable holding the WAL file path
pub const ENV_WAL_PATH: &str = "WAL_FILE_NAME";

/// Environment variable holding the snapshot file path
pub const ENV_SNAPSHOT_PATH: &str = "SNAPSHOT_FILE_NAME";

/// Main configuration for a TabulaDB instance
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Encrypted snapshot written at checkpoint, read on open
    pub snapshot_path: PathBuf,

    /// Write-ahead log, one entry per line
    pub wal_path: PathBuf,

    // -------------------------------------------------------------------------
    // Security Configuration
    // -------------------------------------------------------------------------
    /// Secret the snapshot key is derived from
    pub encryption_key: String,

    // -------------------------------------------------------------------------
    // Recovery Configuration
    // -------------------------------------------------------------------------
    /// Whether the bootstrap step should replay the WAL on startup
    pub recover_on_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("./database.snapshot"),
            wal_path: PathBuf::from("./database.wal"),
            encryption_key: DEFAULT_ENCRYPTION_KEY.to_string(),
            recover_on_open: true,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("snapshot_path", &self.snapshot_path)
            .field("wal_path", &self.wal_path)
            .field("encryption_key", &"[REDACTED]")
            .field("recover_on_open", &self.recover_on_open)
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from `SEC_KEY`, `WAL_FILE_NAME` and `SNAPSHOT_FILE_NAME`,
    /// falling back to the defaults for anything unset or empty.
    pub fn from_env() -> Self {
        let mut builder = Self::builder();

        if let Some(key) = non_empty_var(ENV_ENCRYPTION_KEY) {
            builder = builder.encryption_key(key);
        }
        if let Some(path) = non_empty_var(ENV_WAL_PATH) {
            builder = builder.wal_path(path);
        }
        if let Some(path) = non_empty_var(ENV_SNAPSHOT_PATH) {
            builder = builder.snapshot_path(path);
        }

        builder.build()
    }

    /// True when snapshots would be sealed with [`DEFAULT_ENCRYPTION_KEY`]
    pub fn uses_fallback_key(&self) -> bool {
        self.encryption_key == DEFAULT_ENCRYPTION_KEY
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Set the WAL file path
    pub fn wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wal_path = path.into();
        self
    }

    /// Place both files in `dir` using the default file names
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.config.snapshot_path = dir.join("database.snapshot");
        self.config.wal_path = dir.join("database.wal");
        self
    }

    /// Set the snapshot encryption key
    pub fn encryption_key(mut self, key: impl Into<String>) -> Self {
        self.config.encryption_key = key.into();
        self
    }

    /// Enable or disable WAL replay in the bootstrap step
    pub fn recover_on_open(mut self, enabled: bool) -> Self {
        self.config.recover_on_open = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
