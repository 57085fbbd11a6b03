//! Meta operations: eval, read-string, throw, gensym, macroexpand
//!
//! These are the reflective surface the self-hosted stdlib builds on.

use crate::env::Environment;
use crate::error::{LispError, Result, ARITY_ONE, ARITY_TWO, ARITY_ZERO_OR_ONE};
use crate::eval;
use crate::intern;
use crate::parser;
use crate::value::{List, Number, Value};
use std::rc::Rc;

fn string_arg<'a>(function: &str, value: &'a Value, position: usize) -> Result<&'a str> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(LispError::type_error(function, "a string", other, position)),
    }
}

/// Evaluates a form in the global environment.
pub fn builtin_eval(args: &[Value], env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("eval", ARITY_ONE, args.len()));
    }
    eval::eval(args[0].clone(), env.global())
}

/// Parses the first form in a string.
pub fn builtin_read_string(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("read-string", ARITY_ONE, args.len()));
    }
    let source = string_arg("read-string", &args[0], 1)?;
    parser::parse_str(source, "<read-string>")
}

/// Parses every form in a string, as a list.
pub fn builtin_read_all_string(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("read-all-string", ARITY_ONE, args.len()));
    }
    let source = string_arg("read-all-string", &args[0], 1)?;
    let forms = parser::parse_all(source, "<read-string>")?;
    Ok(Value::List(forms.into_iter().collect::<List>()))
}

/// Raises a RuntimeError carrying the display form of the argument.
pub fn builtin_throw(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("throw", ARITY_ONE, args.len()));
    }
    Err(LispError::runtime(args[0].display_string()))
}

/// A fresh symbol, optionally with a prefix, unique within this process.
pub fn builtin_gensym(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() > 1 {
        return Err(LispError::arity_error("gensym", ARITY_ZERO_OR_ONE, args.len()));
    }
    let prefix = match args.first() {
        None => "G",
        Some(Value::String(s)) => s,
        Some(Value::Symbol(s)) => s,
        Some(other) => return Err(LispError::type_error("gensym", "a string prefix", other, 1)),
    };
    Ok(Value::Symbol(intern::gensym(prefix)))
}

/// Expands a macro call form once and returns the expansion without
/// evaluating it. Non-macro forms come back unchanged.
pub fn builtin_macroexpand(args: &[Value], env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("macroexpand", ARITY_ONE, args.len()));
    }
    if let Value::List(list) = &args[0] {
        if let Some((Value::Symbol(name), tail)) = list.split_first() {
            if let Some(Value::Macro(mac)) = env.get(name) {
                let macro_args: Vec<Value> = tail.iter().cloned().collect();
                return eval::expand_macro(&mac, &macro_args, name, 0);
            }
        }
    }
    Ok(args[0].clone())
}

/// Identity comparison: interned names, strings, and collections compare by
/// pointer; immediate values compare by bits.
pub fn builtin_identical_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 2 {
        return Err(LispError::arity_error("identical?", ARITY_TWO, args.len()));
    }
    Ok(Value::Bool(identical(&args[0], &args[1])))
}

fn identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(Number::Int(x)), Value::Number(Number::Int(y))) => x == y,
        (Value::Number(Number::Float(x)), Value::Number(Number::Float(y))) => {
            x.to_bits() == y.to_bits()
        }
        (Value::String(x), Value::String(y)) => Rc::ptr_eq(x, y),
        (Value::Symbol(x), Value::Symbol(y)) => Rc::ptr_eq(x, y),
        (Value::Keyword(x), Value::Keyword(y)) => Rc::ptr_eq(x, y),
        (Value::List(x), Value::List(y)) => x.ptr_eq(y),
        (Value::Vector(x), Value::Vector(y)) => Rc::ptr_eq(x, y),
        (Value::Map(x), Value::Map(y)) => Rc::ptr_eq(x, y),
        (Value::Set(x), Value::Set(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => x.name == y.name,
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Macro(x), Value::Macro(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Register all meta builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define(env, "eval", builtin_eval);
    super::define(env, "read-string", builtin_read_string);
    super::define(env, "read-all-string", builtin_read_all_string);
    super::define(env, "throw", builtin_throw);
    super::define(env, "gensym", builtin_gensym);
    super::define(env, "macroexpand", builtin_macroexpand);
    super::define(env, "identical?", builtin_identical_q);
}
