//! Response definitions
//!
//! Human-readable results of shell commands.

use std::fmt;

use crate::table::Record;

/// Width of one column in row listings
const COLUMN_WIDTH: usize = 15;

pub const HELP: &str = "\
Available commands:
  create <table_name> <column1> <column2> ...  Create a new table
  drop <table_name>                            Drop a table
  list                                         List all tables
  insert <table_name> <value1> <value2> ...    Insert a new record
  select <table_name> [<column>=<value>]       Select records
  update <table_name> <col>=<val> <cond_col>=<cond_val>  Update records
  delete <table_name> <column>=<value>         Delete records
  help                                         Show this help message
  exit                                         Exit the program";

/// Result of one shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    TableCreated(String),
    TableDropped(String),

    /// Table names, sorted for display
    Tables(Vec<String>),

    Inserted,

    /// Rows with the table's declared column order
    Records {
        columns: Vec<String>,
        records: Vec<Record>,
    },

    Updated(usize),
    Deleted(usize),
    Help,
    Exit,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::TableCreated(name) => write!(f, "Table '{}' created successfully.", name),
            Output::TableDropped(name) => write!(f, "Table '{}' dropped successfully.", name),
            Output::Tables(names) if names.is_empty() => write!(f, "No tables found."),
            Output::Tables(names) => {
                write!(f, "Tables:")?;
                for name in names {
                    write!(f, "\n- {}", name)?;
                }
                Ok(())
            }
            Output::Inserted => write!(f, "Record inserted successfully."),
            Output::Records { records, .. } if records.is_empty() => {
                write!(f, "No records found.")
            }
            Output::Records { columns, records } => {
                for column in columns {
                    write!(f, "{:<width$}", column, width = COLUMN_WIDTH)?;
                }
                for record in records {
                    writeln!(f)?;
                    for column in columns {
                        let value = record.get(column).unwrap_or("");
                        write!(f, "{:<width$}", value, width = COLUMN_WIDTH)?;
                    }
                }
                Ok(())
            }
            Output::Updated(count) => write!(f, "{} record(s) updated successfully.", count),
            Output::Deleted(count) => write!(f, "{} record(s) deleted successfully.", count),
            Output::Help => write!(f, "{}", HELP),
            Output::Exit => write!(f, "Goodbye!"),
        }
    }
}
