//! Shell Module
//!
//! Text command surface over a [`Database`].
//!
//! ## Commands
//! - `create <table> <col>...`
//! - `drop <table>`
//! - `list`
//! - `insert <table> <val>...`
//! - `select <table> [col=value]`
//! - `update <table> col=value cond_col=cond_value`
//! - `delete <table> col=value`
//! - `help`, `exit`
//!
//! Conditions are single `column=value` equalities.

mod command;
mod output;

pub use command::Command;
pub use output::{Output, HELP};

use std::sync::Arc;

use crate::database::Database;
use crate::error::Result;

/// Executes parsed commands against a shared database
pub struct Shell {
    db: Arc<Database>,
}

impl Shell {
    /// Create a shell over `db`
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Parse and execute one input line
    pub fn execute_line(&self, line: &str) -> Result<Output> {
        let command = Command::parse(line)?;
        tracing::trace!(?command, "Executing command");
        self.execute(command)
    }

    /// Execute a command and return its output
    pub fn execute(&self, command: Command) -> Result<Output> {
        match command {
            Command::Create { table, columns } => {
                self.db.create_table(&table, columns)?;
                Ok(Output::TableCreated(table))
            }
            Command::Drop { table } => {
                self.db.drop_table(&table)?;
                Ok(Output::TableDropped(table))
            }
            Command::List => {
                let mut names = self.db.list_tables();
                names.sort();
                Ok(Output::Tables(names))
            }
            Command::Insert { table, values } => {
                self.db.insert_record(&table, values)?;
                Ok(Output::Inserted)
            }
            Command::Select { table, selector } => {
                let columns = self.db.get_table(&table)?.columns();
                let records = self.db.select_records(&table, &selector)?;
                Ok(Output::Records { columns, records })
            }
            Command::Update {
                table,
                updates,
                selector,
            } => {
                let count = self.db.update_records(&table, &updates, &selector)?;
                Ok(Output::Updated(count))
            }
            Command::Delete { table, selector } => {
                let count = self.db.delete_records(&table, &selector)?;
                Ok(Output::Deleted(count))
            }
            Command::Help => Ok(Output::Help),
            Command::Exit => Ok(Output::Exit),
        }
    }

    /// The database this shell drives
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}
