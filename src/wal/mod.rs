//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append log entries before any mutation
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Crash recovery and replay
//!
//! ## File Format
//! One entry per line, so the log stays greppable:
//! ```text
//! ┌──────────────┬───┬──────────────────────────────────────────┬────┐
//! │ CRC32 (8 hex)│ ␠ │ JSON entry                               │ \n │
//! └──────────────┴───┴──────────────────────────────────────────┴────┘
//! 1c2d3e4f {"lsn":1,"table_name":"users","operation":"create","columns":["id","name"],"created_at":1700000000000}
//! 9a8b7c6d {"lsn":2,"table_name":"users","operation":"insert","values":["1","Ann"],"created_at":1700000000004}
//! ```

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{WalEntry, Operation, HEADER_SIZE, KNOWN_OPERATIONS};
pub use writer::WalWriter;
pub use reader::{WalReader, WalIterator};
pub use recovery::{WalRecovery, RecoveryResult};
