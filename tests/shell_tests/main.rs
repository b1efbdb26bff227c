//! Shell Tests
//!
//! Tests verify:
//! - Command parsing and usage errors
//! - Output formatting
//! - End-to-end command execution against a database

use std::collections::BTreeMap;
use std::sync::Arc;

use tabuladb::shell::{Command, Output, Shell, HELP};
use tabuladb::{Config, Database, Record, Selector, TabulaError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_shell() -> (TempDir, Shell) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .encryption_key("shell-secret")
        .build();
    let db = Database::open(config).unwrap();
    (temp_dir, Shell::new(Arc::new(db)))
}

fn run(shell: &Shell, line: &str) -> String {
    match shell.execute_line(line) {
        Ok(output) => output.to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_create() {
    let cmd = Command::parse("create users id name").unwrap();
    assert_eq!(
        cmd,
        Command::Create {
            table: "users".to_string(),
            columns: strings(&["id", "name"]),
        }
    );
}

#[test]
fn test_parse_is_case_insensitive_for_verbs_only() {
    let cmd = Command::parse("INSERT Users 1 Ann").unwrap();
    assert_eq!(
        cmd,
        Command::Insert {
            table: "Users".to_string(),
            values: strings(&["1", "Ann"]),
        }
    );
}

#[test]
fn test_parse_select_with_and_without_condition() {
    assert_eq!(
        Command::parse("select users").unwrap(),
        Command::Select {
            table: "users".to_string(),
            selector: Selector::All,
        }
    );
    assert_eq!(
        Command::parse("select users id=1").unwrap(),
        Command::Select {
            table: "users".to_string(),
            selector: Selector::equals("id", "1"),
        }
    );
}

#[test]
fn test_parse_update() {
    let mut updates = BTreeMap::new();
    updates.insert("name".to_string(), "Carl".to_string());

    assert_eq!(
        Command::parse("update users name=Carl id=1").unwrap(),
        Command::Update {
            table: "users".to_string(),
            updates,
            selector: Selector::equals("id", "1"),
        }
    );
}

#[test]
fn test_parse_condition_splits_on_first_equals() {
    assert_eq!(
        Command::parse("delete t expr=a=b").unwrap(),
        Command::Delete {
            table: "t".to_string(),
            selector: Selector::equals("expr", "a=b"),
        }
    );
}

#[test]
fn test_parse_simple_commands() {
    assert_eq!(Command::parse("list").unwrap(), Command::List);
    assert_eq!(Command::parse("help").unwrap(), Command::Help);
    assert_eq!(Command::parse("exit").unwrap(), Command::Exit);
    assert_eq!(Command::parse("quit").unwrap(), Command::Exit);
    assert_eq!(
        Command::parse("drop users").unwrap(),
        Command::Drop {
            table: "users".to_string()
        }
    );
}

#[test]
fn test_parse_errors() {
    let bad = [
        "",
        "create users",
        "drop",
        "drop a b",
        "insert users",
        "select",
        "select users a=1 b=2",
        "select users noequals",
        "update users id=1",
        "update users name=Carl id",
        "delete users",
        "delete users =x",
        "frobnicate",
    ];

    for line in bad {
        let err = Command::parse(line).unwrap_err();
        assert!(
            matches!(err, TabulaError::InvalidCommand(_)),
            "'{}' should be rejected",
            line
        );
    }
}

// =============================================================================
// Output Formatting Tests
// =============================================================================

#[test]
fn test_output_messages() {
    assert_eq!(
        Output::TableCreated("users".to_string()).to_string(),
        "Table 'users' created successfully."
    );
    assert_eq!(Output::Tables(Vec::new()).to_string(), "No tables found.");
    assert_eq!(
        Output::Tables(strings(&["a", "b"])).to_string(),
        "Tables:\n- a\n- b"
    );
    assert_eq!(Output::Updated(2).to_string(), "2 record(s) updated successfully.");
    assert_eq!(Output::Deleted(0).to_string(), "0 record(s) deleted successfully.");
    assert_eq!(Output::Help.to_string(), HELP);
    assert_eq!(Output::Exit.to_string(), "Goodbye!");
}

#[test]
fn test_output_records_table() {
    let output = Output::Records {
        columns: strings(&["id", "name"]),
        records: vec![Record::from_iter([("id", "1"), ("name", "Ann")])],
    };

    let text = output.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("{:<15}{:<15}", "id", "name"));
    assert_eq!(lines[1], format!("{:<15}{:<15}", "1", "Ann"));

    let empty = Output::Records {
        columns: strings(&["id"]),
        records: Vec::new(),
    };
    assert_eq!(empty.to_string(), "No records found.");
}

// =============================================================================
// Execution Tests
// =============================================================================

#[test]
fn test_session() {
    let (_temp, shell) = setup_shell();

    assert_eq!(run(&shell, "list"), "No tables found.");
    assert_eq!(
        run(&shell, "create users id name"),
        "Table 'users' created successfully."
    );
    assert_eq!(run(&shell, "insert users 1 Ann"), "Record inserted successfully.");
    assert_eq!(run(&shell, "insert users 2 Bo"), "Record inserted successfully.");
    assert_eq!(
        run(&shell, "update users name=Carl id=1"),
        "1 record(s) updated successfully."
    );
    assert_eq!(
        run(&shell, "select users id=1"),
        format!("{:<15}{:<15}\n{:<15}{:<15}", "id", "name", "1", "Carl")
    );
    assert_eq!(
        run(&shell, "delete users id=2"),
        "1 record(s) deleted successfully."
    );
    assert_eq!(run(&shell, "select users id=2"), "No records found.");
    assert_eq!(run(&shell, "list"), "Tables:\n- users");
    assert_eq!(
        run(&shell, "drop users"),
        "Table 'users' dropped successfully."
    );
}

#[test]
fn test_errors_are_reported() {
    let (_temp, shell) = setup_shell();

    assert_eq!(
        run(&shell, "select ghosts"),
        "Error: table 'ghosts' does not exist"
    );

    run(&shell, "create users id name");
    assert_eq!(
        run(&shell, "create users id"),
        "Error: table 'users' already exists"
    );
    assert_eq!(
        run(&shell, "insert users 1"),
        "Error: invalid number of values: expected 2, got 1"
    );
    assert_eq!(run(&shell, "bogus"), "Error: unknown command: bogus");
}

#[test]
fn test_list_is_sorted() {
    let (_temp, shell) = setup_shell();

    for name in ["zeta", "alpha", "mid"] {
        shell.execute_line(&format!("create {} v", name)).unwrap();
    }

    assert_eq!(
        shell.execute_line("list").unwrap(),
        Output::Tables(strings(&["alpha", "mid", "zeta"]))
    );
}

#[test]
fn test_exit_does_not_touch_database() {
    let (_temp, shell) = setup_shell();

    assert_eq!(shell.execute(Command::Exit).unwrap(), Output::Exit);
    assert!(shell.database().is_wal_open());
}
