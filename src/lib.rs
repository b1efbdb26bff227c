//! # TabulaDB
//!
//! An embedded, single-process tabular data store with:
//! - Named tables of string rows, columns fixed per table
//! - Write-Ahead Logging (WAL) for durability
//! - Crash recovery by WAL replay
//! - Encrypted snapshots (AES-256-GCM) at checkpoint
//! - Per-table multi-reader/single-writer concurrency
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Shell (commands)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Database                               │
//! │          (name → table map, RwLock per level)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │     WAL     │ │   Tables    │ │  Snapshot   │
//!   │  (Append)   │ │  (RwLock)   │ │ (Encrypted) │
//!   └─────────────┘ └─────────────┘ └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod table;
pub mod wal;
pub mod snapshot;
pub mod database;
pub mod shell;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TabulaError, Result};
pub use config::Config;
pub use database::Database;
pub use table::{Record, Selector, Table};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TabulaDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
