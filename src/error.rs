// ABOUTME: Error types and diagnostics for the Lisp interpreter

use crate::value::Value;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

// ===== Arity constant strings (shared by builtins and special forms) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_ZERO_OR_ONE: &str = "0-1";
pub const ARITY_ONE_OR_TWO: &str = "1-2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

pub type Result<T> = std::result::Result<T, LispError>;

/// Error taxonomy. Every failure in the interpreter is one of these kinds;
/// the REPL and CLI drivers only ever distinguish errors by kind and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source text.
    Parse,
    /// Reference to an unbound symbol.
    Name,
    /// Wrong number of arguments to a function, macro, special form, or recur.
    Arity,
    /// Operand of the wrong variant for an operation.
    Type,
    /// Correctly typed but invalid (division by zero, index out of bounds).
    Argument,
    /// Raised by `throw` or by unrecognized conditions.
    Runtime,
    /// File system failures.
    Io,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Parse => "ParseError",
            ErrorKind::Name => "NameError",
            ErrorKind::Arity => "ArityError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Argument => "ArgumentError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Io => "IOError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A source position: file name (or `<repl>`), 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct LispError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
    /// Frame descriptions accumulated while the error bubbles up, innermost
    /// first ("calling function f", "loading file foo.lisp", ...).
    pub trace: Vec<String>,
}

impl LispError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        LispError {
            kind,
            message: message.into(),
            location: None,
            trace: Vec::new(),
        }
    }

    /// A malformed-source error anchored at a position.
    pub fn parse(message: impl Into<String>, location: Location) -> Self {
        LispError::new(ErrorKind::Parse, message).at(location)
    }

    /// An unbound-symbol error; suggestions come from the scope chain.
    pub fn name_error(name: &str, suggestions: &[Rc<str>]) -> Self {
        let message = if suggestions.is_empty() {
            format!("undefined symbol '{}'", name)
        } else {
            let names: Vec<&str> = suggestions.iter().map(|s| &**s).collect();
            format!(
                "undefined symbol '{}' (did you mean {}?)",
                name,
                names.join(" or ")
            )
        };
        LispError::new(ErrorKind::Name, message)
    }

    /// Create an arity error with expected and actual counts.
    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        let expected = expected.into();
        let plural = if expected == ARITY_ONE { "" } else { "s" };
        LispError::new(
            ErrorKind::Arity,
            format!(
                "{}: expected {} argument{}, got {}",
                function, expected, plural, actual
            ),
        )
    }

    /// Create a type mismatch error with full context.
    pub fn type_error(function: &str, expected: &str, actual: &Value, position: usize) -> Self {
        LispError::new(
            ErrorKind::Type,
            format!(
                "{}: expected {}, got {} at argument {}",
                function,
                expected,
                actual.type_name(),
                position
            ),
        )
    }

    /// Create an argument error (well-typed but invalid) with function context.
    pub fn argument_error(function: &str, message: impl Into<String>) -> Self {
        LispError::new(
            ErrorKind::Argument,
            format!("{}: {}", function, message.into()),
        )
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        LispError::new(ErrorKind::Runtime, message)
    }

    pub fn io_error(operation: &str, path: &str, err: &std::io::Error) -> Self {
        LispError::new(ErrorKind::Io, format!("{}: {}: {}", operation, path, err))
    }

    /// Attach a location if none is set yet; the innermost location wins.
    pub fn at(mut self, location: Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }

    /// Push a trace frame description as the error propagates.
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        self.trace.push(frame.into());
        self
    }

    /// The full multi-line diagnostic printed by the REPL and CLI drivers.
    pub fn render(&self) -> String {
        let mut out = format!("{}: {}", self.kind, self.message);
        if let Some(location) = &self.location {
            out.push_str(&format!("\n  at {}", location));
        }
        for frame in &self.trace {
            out.push_str(&format!("\n  while {}", frame));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern;

    fn here() -> Location {
        Location {
            file: Rc::from("<repl>"),
            line: 3,
            column: 7,
        }
    }

    #[test]
    fn test_render_includes_kind_location_and_trace() {
        let err = LispError::parse("unterminated string", here())
            .in_frame("loading file scratch.lisp");
        let rendered = err.render();
        assert!(rendered.starts_with("ParseError: unterminated string"));
        assert!(rendered.contains("at <repl>:3:7"));
        assert!(rendered.contains("while loading file scratch.lisp"));
    }

    #[test]
    fn test_name_error_suggestions() {
        let err = LispError::name_error("fitler", &[intern::symbol("filter")]);
        assert_eq!(
            err.to_string(),
            "NameError: undefined symbol 'fitler' (did you mean filter?)"
        );

        let bare = LispError::name_error("nope", &[]);
        assert_eq!(bare.to_string(), "NameError: undefined symbol 'nope'");
    }

    #[test]
    fn test_arity_error_pluralization() {
        let one = LispError::arity_error("quote", ARITY_ONE, 2);
        assert_eq!(one.to_string(), "ArityError: quote: expected 1 argument, got 2");

        let range = LispError::arity_error("if", ARITY_TWO_OR_THREE, 5);
        assert_eq!(range.to_string(), "ArityError: if: expected 2-3 arguments, got 5");
    }

    #[test]
    fn test_innermost_location_wins() {
        let inner = here();
        let err = LispError::runtime("boom").at(inner.clone()).at(Location {
            file: Rc::from("outer.lisp"),
            line: 1,
            column: 1,
        });
        assert_eq!(err.location, Some(inner));
    }
}
