//! Tests for WAL Recovery
//!
//! These tests verify:
//! - Recovery from a clean log
//! - Truncation of an interrupted final append
//! - Corrupt complete lines abort recovery
//! - verify() never modifies the file

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tabuladb::wal::{Operation, RecoveryResult, WalRecovery, WalWriter};
use tabuladb::TabulaError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn write_inserts(path: &PathBuf, count: usize) {
    let mut writer = WalWriter::open(path).unwrap();
    for i in 0..count {
        writer
            .append(
                "t",
                Operation::Insert {
                    values: vec![i.to_string()],
                },
            )
            .unwrap();
    }
}

fn append_raw(path: &PathBuf, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

// =============================================================================
// Clean Recovery Tests
// =============================================================================

#[test]
fn test_recover_missing_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result, RecoveryResult::default());
    assert!(!wal_path.exists());
}

#[test]
fn test_recover_clean_log() {
    let (_temp, wal_path) = setup_temp_wal();
    write_inserts(&wal_path, 5);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 5);
    assert_eq!(result.entries_recovered, 5);
    assert_eq!(result.last_lsn, 5);
    assert!(!result.was_truncated);
    assert_eq!(result.bytes_truncated, 0);

    let lsns: Vec<u64> = entries.iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 2, 3, 4, 5]);
}

// =============================================================================
// Torn Tail Tests
// =============================================================================

#[test]
fn test_recover_truncates_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();
    write_inserts(&wal_path, 3);
    let good_len = fs::metadata(&wal_path).unwrap().len();

    append_raw(&wal_path, b"1234abcd {\"lsn\":4,\"table_na");

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 3);
    assert!(result.was_truncated);
    assert_eq!(result.bytes_truncated, 27);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), good_len);

    // Second pass finds a clean log
    let (_, again) = WalRecovery::recover(&wal_path).unwrap();
    assert!(!again.was_truncated);
    assert_eq!(again.entries_recovered, 3);
}

#[test]
fn test_verify_does_not_modify() {
    let (_temp, wal_path) = setup_temp_wal();
    write_inserts(&wal_path, 2);
    append_raw(&wal_path, b"partial");
    let len_before = fs::metadata(&wal_path).unwrap().len();

    let result = WalRecovery::verify(&wal_path).unwrap();

    assert_eq!(result.entries_recovered, 2);
    assert!(result.was_truncated);
    assert_eq!(result.bytes_truncated, 7);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), len_before);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupt_complete_line_aborts_recovery() {
    let (_temp, wal_path) = setup_temp_wal();
    write_inserts(&wal_path, 2);
    append_raw(&wal_path, b"deadbeef {\"not\":\"an entry\"}\n");
    let len_before = fs::metadata(&wal_path).unwrap().len();

    let err = WalRecovery::recover(&wal_path).unwrap_err();

    assert!(matches!(err, TabulaError::WalCorrupt { line: 3, .. }));
    // Nothing is cut off when the damage is not at the tail
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), len_before);
}

#[test]
fn test_writer_refuses_corrupt_log() {
    let (_temp, wal_path) = setup_temp_wal();
    fs::write(&wal_path, b"not a wal\n").unwrap();

    assert!(WalWriter::open(&wal_path).is_err());
}
