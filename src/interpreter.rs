// ABOUTME: Interpreter construction, stdlib bootstrap, and eval drivers

use crate::builtins::register_builtins;
use crate::env::Environment;
use crate::error::{LispError, Result};
use crate::eval;
use crate::parser;
use crate::value::Value;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Stdlib source files, in load order. `core.lisp` carries the macros and
/// sequence functions everything else assumes; `enhanced.lisp` layers
/// optional helpers on top.
const STDLIB_FILES: [&str; 2] = ["core.lisp", "enhanced.lisp"];

/// Prefixes probed for the stdlib directory, relative to the working
/// directory.
const STDLIB_PREFIXES: [&str; 4] = [
    "lisp/stdlib",
    "./lisp/stdlib",
    "../lisp/stdlib",
    "../../lisp/stdlib",
];

/// A global environment with builtins registered, plus the drivers that
/// read-eval source for the REPL, script mode, and `-e` mode.
pub struct Interpreter {
    global: Rc<Environment>,
}

impl Interpreter {
    /// Builtins only; the stdlib is not loaded.
    pub fn new() -> Interpreter {
        let global = Environment::new();
        register_builtins(&global);
        Interpreter { global }
    }

    /// Builtins plus whatever stdlib files can be located.
    pub fn with_stdlib() -> Interpreter {
        let interpreter = Interpreter::new();
        interpreter.load_stdlib();
        interpreter
    }

    pub fn global(&self) -> Rc<Environment> {
        self.global.clone()
    }

    /// Locates and loads the stdlib. A missing file just means the
    /// higher-level helpers are absent; a file that fails to evaluate
    /// prints a warning and loading continues.
    pub fn load_stdlib(&self) {
        for name in STDLIB_FILES {
            let Some(path) = find_stdlib_file(name) else {
                continue;
            };
            let display = path.display().to_string();
            match std::fs::read_to_string(&path) {
                Ok(source) => {
                    if let Err(e) = self.eval_source(&source, &display) {
                        eprintln!("Warning: failed to load stdlib module {}: {}", name, e);
                    }
                }
                Err(e) => {
                    eprintln!("Warning: cannot read stdlib module {}: {}", name, e);
                }
            }
        }
    }

    /// Parses and evaluates every form in `source`, returning the value of
    /// the last one (nil when there are none).
    pub fn eval_source(&self, source: &str, file: &str) -> Result<Value> {
        let mut result = Value::Nil;
        for form in parser::parse_all(source, file)? {
            result = eval::eval(form, self.global.clone())?;
        }
        Ok(result)
    }

    pub fn eval_file(&self, path: &Path) -> Result<Value> {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path)
            .map_err(|e| LispError::io_error("load", &display, &e))?;
        self.eval_source(&source, &display)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn find_stdlib_file(name: &str) -> Option<PathBuf> {
    STDLIB_PREFIXES
        .iter()
        .map(|prefix| Path::new(prefix).join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_source_returns_the_last_form() {
        let interpreter = Interpreter::new();
        let result = interpreter
            .eval_source("(def x 2) (+ x 3)", "<test>")
            .expect("should evaluate");
        assert_eq!(result.to_string(), "5");
    }

    #[test]
    fn test_empty_source_is_nil() {
        let interpreter = Interpreter::new();
        let result = interpreter
            .eval_source("; just a comment\n", "<test>")
            .expect("should evaluate");
        assert_eq!(result, Value::Nil);
    }

    #[test]
    fn test_errors_carry_the_file_name() {
        let interpreter = Interpreter::new();
        let err = interpreter.eval_source("(1 2", "scratch.lisp").unwrap_err();
        let location = err.location.expect("parse errors are located");
        assert_eq!(&*location.file, "scratch.lisp");
    }

    #[test]
    fn test_load_stdlib_never_fails_construction() {
        // Whether or not the stdlib files are found, loading must not error.
        let interpreter = Interpreter::new();
        interpreter.load_stdlib();
        assert!(interpreter.eval_source("(+ 1 2)", "<test>").is_ok());
    }
}
