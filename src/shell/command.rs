//! Command definitions
//!
//! Parses one line of shell input into a typed command.

use std::collections::BTreeMap;

use crate::error::{Result, TabulaError};
use crate::table::Selector;

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create <table> <col>...`
    Create { table: String, columns: Vec<String> },

    /// `drop <table>`
    Drop { table: String },

    /// `list`
    List,

    /// `insert <table> <val>...`
    Insert { table: String, values: Vec<String> },

    /// `select <table> [col=value]`
    Select { table: String, selector: Selector },

    /// `update <table> col=value... cond_col=cond_value`
    Update {
        table: String,
        updates: BTreeMap<String, String>,
        selector: Selector,
    },

    /// `delete <table> col=value`
    Delete { table: String, selector: Selector },

    /// `help`
    Help,

    /// `exit`
    Exit,
}

impl Command {
    /// Parse a whitespace-separated command line
    ///
    /// The verb is case-insensitive; `col=value` splits on the first `=`.
    pub fn parse(line: &str) -> Result<Self> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let (verb, args) = match args.split_first() {
            Some((verb, rest)) => (verb.to_lowercase(), rest),
            None => return Err(usage("empty command")),
        };

        match verb.as_str() {
            "create" => match args {
                [table, columns @ ..] if !columns.is_empty() => Ok(Command::Create {
                    table: table.to_string(),
                    columns: owned(columns),
                }),
                _ => Err(usage("usage: create <table_name> <column1> <column2> ...")),
            },
            "drop" => match args {
                [table] => Ok(Command::Drop {
                    table: table.to_string(),
                }),
                _ => Err(usage("usage: drop <table_name>")),
            },
            "list" => match args {
                [] => Ok(Command::List),
                _ => Err(usage("usage: list")),
            },
            "insert" => match args {
                [table, values @ ..] if !values.is_empty() => Ok(Command::Insert {
                    table: table.to_string(),
                    values: owned(values),
                }),
                _ => Err(usage("usage: insert <table_name> <value1> <value2> ...")),
            },
            "select" => match args {
                [table] => Ok(Command::Select {
                    table: table.to_string(),
                    selector: Selector::All,
                }),
                [table, condition] => Ok(Command::Select {
                    table: table.to_string(),
                    selector: parse_condition(condition)?,
                }),
                _ => Err(usage("usage: select <table_name> [<column>=<value>]")),
            },
            "update" => match args {
                [table, assignments @ .., condition] if !assignments.is_empty() => {
                    let updates = assignments
                        .iter()
                        .map(|arg| parse_pair(arg))
                        .collect::<Result<BTreeMap<_, _>>>()?;
                    Ok(Command::Update {
                        table: table.to_string(),
                        updates,
                        selector: parse_condition(condition)?,
                    })
                }
                _ => Err(usage(
                    "usage: update <table_name> <column>=<value> <condition_column>=<condition_value>",
                )),
            },
            "delete" => match args {
                [table, condition] => Ok(Command::Delete {
                    table: table.to_string(),
                    selector: parse_condition(condition)?,
                }),
                _ => Err(usage("usage: delete <table_name> <column>=<value>")),
            },
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            other => Err(usage(&format!("unknown command: {}", other))),
        }
    }
}

fn parse_condition(arg: &str) -> Result<Selector> {
    let (column, value) = parse_pair(arg)?;
    Ok(Selector::Equals { column, value })
}

fn parse_pair(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((column, value)) if !column.is_empty() => Ok((column.to_string(), value.to_string())),
        _ => Err(usage(&format!("invalid condition format: '{}' (expected column=value)", arg))),
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn usage(message: &str) -> TabulaError {
    TabulaError::InvalidCommand(message.to_string())
}
