//! Record and Selector Tests
//!
//! Tests verify:
//! - get/set/delete on a record
//! - Deep copies
//! - Selector matching rules

use tabuladb::{Record, Selector};

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_new_record_is_empty() {
    let record = Record::new();
    assert!(record.is_empty());
    assert_eq!(record.len(), 0);
    assert_eq!(record.get("id"), None);
}

#[test]
fn test_set_and_get() {
    let mut record = Record::new();
    record.set("id", "1");
    record.set("name", "Ann");

    assert_eq!(record.get("id"), Some("1"));
    assert_eq!(record.get("name"), Some("Ann"));
    assert_eq!(record.len(), 2);
}

#[test]
fn test_set_overwrites() {
    let mut record = Record::new();
    record.set("name", "Ann");
    record.set("name", "Bo");

    assert_eq!(record.get("name"), Some("Bo"));
    assert_eq!(record.len(), 1);
}

#[test]
fn test_delete_column() {
    let mut record: Record = [("id", "1"), ("name", "Ann")].into_iter().collect();

    assert_eq!(record.delete("name"), Some("Ann".to_string()));
    assert_eq!(record.delete("name"), None);
    assert_eq!(record.columns(), vec!["id".to_string()]);
}

#[test]
fn test_columns_and_values_line_up() {
    let record: Record = [("b", "2"), ("a", "1")].into_iter().collect();

    let mut pairs: Vec<(String, String)> = record
        .columns()
        .into_iter()
        .zip(record.values())
        .collect();
    pairs.sort();

    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn test_clone_is_deep() {
    let mut original: Record = [("id", "1")].into_iter().collect();
    let copy = original.clone();

    original.set("id", "changed");

    assert_eq!(copy.get("id"), Some("1"));
    assert_ne!(original, copy);
}

// =============================================================================
// Selector Tests
// =============================================================================

#[test]
fn test_selector_all_matches_everything() {
    assert!(Selector::All.matches(&Record::new()));
    assert!(Selector::default().matches(&[("x", "y")].into_iter().collect()));
}

#[test]
fn test_selector_equals() {
    let record: Record = [("id", "1"), ("name", "Ann")].into_iter().collect();

    assert!(Selector::equals("id", "1").matches(&record));
    assert!(!Selector::equals("id", "2").matches(&record));
}

#[test]
fn test_selector_missing_column_never_matches() {
    let record: Record = [("id", "1")].into_iter().collect();

    assert!(!Selector::equals("name", "").matches(&record));
}

#[test]
fn test_selector_from_condition() {
    assert_eq!(Selector::from(None), Selector::All);
    assert_eq!(
        Selector::from(Some(("id".to_string(), "1".to_string()))),
        Selector::equals("id", "1")
    );
}

#[test]
fn test_selector_display() {
    assert_eq!(Selector::All.to_string(), "*");
    assert_eq!(Selector::equals("id", "7").to_string(), "id=7");
}
