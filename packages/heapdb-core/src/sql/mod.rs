//! Statement boundary.
//!
//! Statements are only classified: the leading keyword gives the kind and,
//! for selects, the table after `FROM` is extracted. Nothing else in the
//! text is interpreted.

mod interpreter;
mod tokenizer;

use std::fmt;

use crate::error::DbError;

pub use interpreter::{ExecuteOutcome, Interpreter};
pub use tokenizer::{Token, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Other,
}

impl StatementKind {
    fn from_keyword(word: &str) -> Self {
        match word.to_ascii_uppercase().as_str() {
            "SELECT" => Self::Select,
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "CREATE" => Self::Create,
            "DROP" => Self::Drop,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Drop => "DROP",
            Self::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// One classified statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    /// Table named after `FROM`, selects only
    pub from_table: Option<String>,
    pub tokens: Vec<Token>,
}

impl Statement {
    fn classify(tokens: Vec<Token>) -> Self {
        let kind = match tokens.first() {
            Some(Token::Word(w)) => StatementKind::from_keyword(w),
            _ => StatementKind::Other,
        };
        let from_table = if kind == StatementKind::Select {
            tokens
                .iter()
                .position(|t| t.is_keyword("FROM"))
                .and_then(|i| tokens.get(i + 1))
                .and_then(Token::identifier)
                .map(str::to_string)
        } else {
            None
        };
        Self {
            kind,
            from_table,
            tokens,
        }
    }
}

/// Splits `text` on `;` and classifies each non-empty statement.
///
/// # Errors
/// `DbError::ParseError` when the text holds no statement or a quote is
/// left open.
pub fn parse(text: &str) -> Result<Vec<Statement>, DbError> {
    let tokens = Tokenizer::new(text).tokenize()?;
    let statements: Vec<Statement> = tokens
        .split(|t| *t == Token::Semicolon)
        .filter(|group| !group.is_empty())
        .map(|group| Statement::classify(group.to_vec()))
        .collect();

    if statements.is_empty() {
        return Err(DbError::ParseError("empty statement".to_string()));
    }
    Ok(statements)
}
