// ABOUTME: Parser building value trees from the token stream

use crate::error::{LispError, Location, Result};
use crate::intern;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::{Number, Value};
use indexmap::{IndexMap, IndexSet};
use std::rc::Rc;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: Rc<str>,
}

impl Parser {
    pub fn new(source: &str, file: &str) -> Result<Parser> {
        let tokens = Lexer::new(source, file).tokenize()?;
        Ok(Parser {
            tokens,
            pos: 0,
            file: Rc::from(file),
        })
    }

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn location_of(&self, token: &Token) -> Location {
        Location {
            file: self.file.clone(),
            line: token.line,
            column: token.column,
        }
    }

    pub fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Parses one form from the stream.
    pub fn parse_form(&mut self) -> Result<Value> {
        let token = self.bump();
        match token.kind {
            TokenKind::LeftParen => {
                let items = self.read_until(&token, TokenKind::RightParen, ')')?;
                Ok(Value::list(items))
            }
            TokenKind::LeftBracket => {
                let items = self.read_until(&token, TokenKind::RightBracket, ']')?;
                Ok(Value::vector(items))
            }
            TokenKind::LeftBrace => {
                let items = self.read_until(&token, TokenKind::RightBrace, '}')?;
                if items.len() % 2 != 0 {
                    return Err(LispError::parse(
                        "map literal requires an even number of forms",
                        self.location_of(&token),
                    ));
                }
                let mut entries = IndexMap::new();
                let mut iter = items.into_iter();
                while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
                    entries.insert(key, value);
                }
                Ok(Value::Map(Rc::new(entries)))
            }
            TokenKind::HashBrace => {
                let items = self.read_until(&token, TokenKind::RightBrace, '}')?;
                Ok(Value::Set(Rc::new(items.into_iter().collect::<IndexSet<_>>())))
            }
            TokenKind::Quote => self.read_wrapped("quote", &token),
            TokenKind::Quasiquote => self.read_wrapped("quasiquote", &token),
            TokenKind::Unquote => self.read_wrapped("unquote", &token),
            TokenKind::UnquoteSplicing => self.read_wrapped("unquote-splicing", &token),
            TokenKind::Int(n) => Ok(Value::Number(Number::Int(n))),
            TokenKind::Float(f) => Ok(Value::Number(Number::Float(f))),
            TokenKind::Str(s) => Ok(Value::string(s)),
            TokenKind::Symbol(name) => Ok(Value::Symbol(intern::symbol(&name))),
            TokenKind::Keyword(name) => Ok(Value::Keyword(intern::keyword(&name))),
            TokenKind::Bool(b) => Ok(Value::Bool(b)),
            TokenKind::Nil => Ok(Value::Nil),
            TokenKind::RightParen => {
                Err(LispError::parse("unexpected ')'", self.location_of(&token)))
            }
            TokenKind::RightBracket => {
                Err(LispError::parse("unexpected ']'", self.location_of(&token)))
            }
            TokenKind::RightBrace => {
                Err(LispError::parse("unexpected '}'", self.location_of(&token)))
            }
            TokenKind::Eof => Err(LispError::parse(
                "unexpected end of input",
                self.location_of(&token),
            )),
        }
    }

    /// Reads forms until the closing delimiter. An unclosed sequence is
    /// reported at the opening delimiter.
    fn read_until(&mut self, open: &Token, close: TokenKind, close_char: char) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            if self.peek().kind == TokenKind::Eof {
                return Err(LispError::parse(
                    format!("missing closing '{}'", close_char),
                    self.location_of(open),
                ));
            }
            if self.peek().kind == close {
                self.bump();
                return Ok(items);
            }
            items.push(self.parse_form()?);
        }
    }

    fn read_wrapped(&mut self, name: &str, token: &Token) -> Result<Value> {
        if self.at_eof() {
            return Err(LispError::parse(
                format!("expected a form after {}", name),
                self.location_of(token),
            ));
        }
        let form = self.parse_form()?;
        Ok(Value::list(vec![Value::Symbol(intern::symbol(name)), form]))
    }
}

/// Parses the first form in `source`. Trailing input is ignored, matching
/// `read-string`.
pub fn parse_str(source: &str, file: &str) -> Result<Value> {
    Parser::new(source, file)?.parse_form()
}

/// Parses every form in `source`, for `load` and the stdlib bootstrap.
pub fn parse_all(source: &str, file: &str) -> Result<Vec<Value>> {
    let mut parser = Parser::new(source, file)?;
    let mut forms = Vec::new();
    while !parser.at_eof() {
        forms.push(parser.parse_form()?);
    }
    Ok(forms)
}
