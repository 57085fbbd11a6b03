// ABOUTME: Lexer producing position-tagged tokens from source text

use crate::error::{LispError, Location, Result};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    /// `#{`, opening a set literal.
    HashBrace,
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Keyword(String),
    Bool(bool),
    Nil,
    Eof,
}

/// A token and the position of its first character.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<str>,
}

fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || "_+-*/=<>!?%&".contains(c)
}

fn is_symbol_continue(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit()
}

impl Lexer {
    pub fn new(source: &str, file: &str) -> Lexer {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            file: Rc::from(file),
        }
    }

    /// Lexes the whole input. The returned stream always ends with an Eof
    /// token carrying the end-of-input position.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let line = self.line;
            let column = self.column;
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };
            let kind = self.next_kind(c)?;
            tokens.push(Token { kind, line, column });
        }
    }

    fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
        }
    }

    fn location_at(&self, line: u32, column: u32) -> Location {
        Location {
            file: self.file.clone(),
            line,
            column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    // Commas read as whitespace, the Clojure convention.
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' {
                self.bump();
            } else if c == ';' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn next_kind(&mut self, c: char) -> Result<TokenKind> {
        match c {
            '(' => {
                self.bump();
                Ok(TokenKind::LeftParen)
            }
            ')' => {
                self.bump();
                Ok(TokenKind::RightParen)
            }
            '[' => {
                self.bump();
                Ok(TokenKind::LeftBracket)
            }
            ']' => {
                self.bump();
                Ok(TokenKind::RightBracket)
            }
            '{' => {
                self.bump();
                Ok(TokenKind::LeftBrace)
            }
            '}' => {
                self.bump();
                Ok(TokenKind::RightBrace)
            }
            '\'' => {
                self.bump();
                Ok(TokenKind::Quote)
            }
            '`' => {
                self.bump();
                Ok(TokenKind::Quasiquote)
            }
            // ~@ must win over ~
            '~' => {
                self.bump();
                if self.peek() == Some('@') {
                    self.bump();
                    Ok(TokenKind::UnquoteSplicing)
                } else {
                    Ok(TokenKind::Unquote)
                }
            }
            '#' => {
                let location = self.location();
                self.bump();
                if self.peek() == Some('{') {
                    self.bump();
                    Ok(TokenKind::HashBrace)
                } else {
                    Err(LispError::parse("expected '{' after '#'", location))
                }
            }
            '"' => self.read_string(),
            ':' => self.read_keyword(),
            '-' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if is_symbol_start(c) => Ok(self.read_symbol_or_literal()),
            other => Err(LispError::parse(
                format!("unexpected character '{}'", other),
                self.location(),
            )),
        }
    }

    fn read_string(&mut self) -> Result<TokenKind> {
        let start_line = self.line;
        let start_column = self.column;
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(LispError::parse(
                        "unterminated string",
                        self.location_at(start_line, start_column),
                    ));
                }
                Some('"') => return Ok(TokenKind::Str(text)),
                Some('\\') => match self.bump() {
                    None => {
                        return Err(LispError::parse(
                            "unterminated string",
                            self.location_at(start_line, start_column),
                        ));
                    }
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                Some(c) => text.push(c),
            }
        }
    }

    fn read_keyword(&mut self) -> Result<TokenKind> {
        let location = self.location();
        self.bump(); // colon
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_symbol_continue(c) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(LispError::parse("expected a name after ':'", location));
        }
        Ok(TokenKind::Keyword(name))
    }

    fn read_number(&mut self) -> Result<TokenKind> {
        let start_line = self.line;
        let start_column = self.column;
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        }
        if is_float {
            let value: f64 = text.parse().map_err(|_| {
                LispError::parse(
                    format!("invalid number literal '{}'", text),
                    self.location_at(start_line, start_column),
                )
            })?;
            Ok(TokenKind::Float(value))
        } else {
            let value: i64 = text.parse().map_err(|_| {
                LispError::parse(
                    format!("integer literal '{}' out of range", text),
                    self.location_at(start_line, start_column),
                )
            })?;
            Ok(TokenKind::Int(value))
        }
    }

    fn read_symbol_or_literal(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_symbol_continue(c) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match name.as_str() {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            "nil" => TokenKind::Nil,
            _ => TokenKind::Symbol(name),
        }
    }
}
