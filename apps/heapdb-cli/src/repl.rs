//! Line-oriented read-eval-print loop over the statement interpreter.

use anyhow::Context;
use heapdb_core::sql::{ExecuteOutcome, Interpreter};
use heapdb_core::table::{Table, VirtualTable};
use heapdb_core::Database;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "sql> ";

pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
}

impl Repl {
    pub fn new(db: Database) -> anyhow::Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialize line editor")?;
        Ok(Self {
            interpreter: Interpreter::new(db),
            editor,
        })
    }

    pub fn into_database(self) -> Database {
        self.interpreter.into_database()
    }

    pub fn run(&mut self) {
        self.print_welcome();

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => println!("^C"),
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error reading input: {}", err);
                    break;
                }
            }
        }
        println!("Bye");
    }

    fn print_welcome(&self) {
        let db = self.interpreter.database();
        println!(
            "heapdb {} - database '{}' with {} table(s)",
            env!("CARGO_PKG_VERSION"),
            db.name(),
            db.table_count()
        );
        println!("Type 'exit' or 'quit' to leave.");
    }

    /// Returns false when the loop should end.
    fn handle_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return true;
        }
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            return false;
        }

        self.editor.add_history_entry(trimmed).ok();
        match self.interpreter.execute(trimmed) {
            Ok(outcomes) => outcomes.iter().for_each(print_outcome),
            Err(err) => {
                tracing::debug!("Statement failed: {:?}", err);
                eprintln!("Error: {}", err);
            }
        }
        true
    }
}

fn print_outcome(outcome: &ExecuteOutcome) {
    match outcome {
        ExecuteOutcome::Rows(rows) => print_rows(rows),
        ExecuteOutcome::NoSource => println!("Nothing to select from"),
        ExecuteOutcome::Unsupported(kind) => println!("{} statements are not supported", kind),
    }
}

fn print_rows(rows: &VirtualTable) {
    let header: Vec<&str> = rows
        .relation()
        .fields()
        .iter()
        .map(|f| f.name())
        .collect();
    println!("{}", header.join(" | "));

    for record in rows {
        let values: Vec<String> = record.render().into_iter().map(|(_, v)| v).collect();
        println!("{}", values.join(" | "));
    }
    println!(
        "{} row{}",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" }
    );
}
