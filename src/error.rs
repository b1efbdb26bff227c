//! Error types for TabulaDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TabulaError
pub type Result<T> = std::result::Result<T, TabulaError>;

/// Unified error type for TabulaDB operations
#[derive(Debug, Error)]
pub enum TabulaError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("invalid number of values: expected {expected}, got {got}")]
    SchemaMismatch { expected: usize, got: usize },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    /// A mutation was rejected because its WAL entry could not be made durable.
    /// The in-memory state was not touched.
    #[error("durability failure, operation not applied: {0}")]
    DurabilityFailure(#[source] Box<TabulaError>),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    #[error("WAL corruption detected at line {line} (byte offset {offset}): {reason}")]
    WalCorrupt {
        line: usize,
        offset: u64,
        reason: String,
    },

    #[error("WAL is closed")]
    WalClosed,

    #[error("unsupported WAL operation '{operation}' at line {line}")]
    UnsupportedWalOperation { operation: String, line: usize },

    /// The WAL holds entries newer than the loaded state. Writing or
    /// checkpointing on top of them would lose them.
    #[error("WAL holds entries up to LSN {wal_lsn} that were never replayed (state covers LSN {applied_lsn}); run recovery first")]
    UnappliedWal { applied_lsn: u64, wal_lsn: u64 },

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("snapshot corrupt: {0}")]
    SnapshotCorrupt(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration / Shell Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidCommand(String),
}

impl TabulaError {
    /// Wrap a WAL failure so callers can tell a rejected mutation apart
    /// from an in-memory error.
    pub fn durability(source: TabulaError) -> Self {
        TabulaError::DurabilityFailure(Box::new(source))
    }
}
