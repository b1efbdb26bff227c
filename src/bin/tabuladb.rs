//! TabulaDB Shell Binary
//!
//! Interactive command shell over an embedded TabulaDB database.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tabuladb::shell::{Output, Shell};
use tabuladb::{Config, Database};
use tracing_subscriber::{fmt, EnvFilter};

const PROMPT: &str = "tabuladb> ";

/// TabulaDB Shell
#[derive(Parser, Debug)]
#[command(name = "tabuladb")]
#[command(about = "Embedded tabular data store with WAL and encrypted snapshots")]
#[command(version)]
struct Args {
    /// Snapshot file (overrides SNAPSHOT_FILE_NAME)
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// WAL file (overrides WAL_FILE_NAME)
    #[arg(short, long)]
    wal: Option<PathBuf>,

    /// Skip WAL replay on startup
    #[arg(long)]
    no_recover: bool,
}

fn main() {
    // Initialize tracing/logging (stderr, so shell output stays clean)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tabuladb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // Environment first, flags override
    let mut config = Config::from_env();
    if let Some(path) = args.snapshot {
        config.snapshot_path = path;
    }
    if let Some(path) = args.wal {
        config.wal_path = path;
    }
    if args.no_recover {
        config.recover_on_open = false;
    }

    tracing::info!("TabulaDB v{}", tabuladb::VERSION);

    let opened = if config.recover_on_open {
        Database::recover(config)
    } else {
        Database::open(config)
    };
    let db = match opened {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!("Failed to load database: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(config = ?db.config(), "Database ready");

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            tracing::error!("Failed to initialize line editor: {}", e);
            std::process::exit(1);
        }
    };

    let shell = Shell::new(Arc::clone(&db));

    println!("Welcome to TabulaDB. Type 'help' for a list of commands.");
    if let Err(e) = run(&shell, &mut editor) {
        tracing::error!("Error reading input: {}", e);
    }

    // Checkpoint on shutdown: snapshot + WAL close
    if let Some(wal_lsn) = db.unapplied_lsn() {
        tracing::warn!(
            wal_lsn,
            "WAL was not replayed; skipping checkpoint and leaving the log in place"
        );
    } else if let Err(e) = db.checkpoint() {
        tracing::error!("Failed to save database: {}", e);
        std::process::exit(1);
    }
    println!("{}", Output::Exit);
}

/// Read-eval-print loop until `exit`, Ctrl-D or Ctrl-C
fn run(shell: &Shell, editor: &mut DefaultEditor) -> Result<(), ReadlineError> {
    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => return Ok(()),
            Err(e) => return Err(e),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        match shell.execute_line(input) {
            Ok(Output::Exit) => return Ok(()),
            Ok(output) => println!("{}", output),
            Err(e) => println!("Error: {}", e),
        }
    }
}
