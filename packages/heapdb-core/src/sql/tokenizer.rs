//! Tokenizer for statement text.

use crate::error::DbError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    QuotedIdentifier(String), // wrapped in "" or ``
    StringLiteral(String),    // wrapped in ''
    Number(String),
    Symbol(char),
    Semicolon,
}

impl Token {
    /// Case-insensitive keyword match on bare words.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// Name carried by a bare word or a quoted identifier.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Token::Word(w) | Token::QuotedIdentifier(w) => Some(w),
            _ => None,
        }
    }
}

pub struct Tokenizer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, DbError> {
        let mut tokens = Vec::new();
        while let Some(&(start, c)) = self.chars.peek() {
            let token = match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '-' if self.input[start..].starts_with("--") => {
                    self.skip_line_comment();
                    continue;
                }
                ';' => {
                    self.chars.next();
                    Token::Semicolon
                }
                '"' | '`' => Token::QuotedIdentifier(self.read_quoted(c)?),
                '\'' => Token::StringLiteral(self.read_quoted('\'')?),
                '0'..='9' => Token::Number(self.read_while(start, |c| c.is_ascii_digit() || c == '.')),
                c if c.is_alphabetic() || c == '_' => {
                    Token::Word(self.read_while(start, |c| c.is_alphanumeric() || c == '_'))
                }
                other => {
                    self.chars.next();
                    Token::Symbol(other)
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn skip_line_comment(&mut self) {
        for (_, c) in self.chars.by_ref() {
            if c == '\n' {
                break;
            }
        }
    }

    fn read_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> String {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        self.input[start..end].to_string()
    }

    /// Reads a quoted run; a doubled quote stands for one literal quote.
    fn read_quoted(&mut self, quote: char) -> Result<String, DbError> {
        let Some((start, _)) = self.chars.next() else {
            return Err(DbError::ParseError("unexpected end of input".to_string()));
        };
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => {
                    if matches!(self.chars.peek(), Some(&(_, next)) if next == quote) {
                        self.chars.next();
                        value.push(quote);
                    } else {
                        return Ok(value);
                    }
                }
                Some((_, c)) => value.push(c),
                None => {
                    return Err(DbError::ParseError(format!(
                        "unterminated {} at offset {}",
                        quote, start
                    )))
                }
            }
        }
    }
}
