//! Comparison operations: =, <, >, <=, >=
//!
//! `=` is structural and n-ary; the ordering comparators are binary and
//! numeric only.

use crate::env::Environment;
use crate::error::{LispError, Result, ARITY_AT_LEAST_ONE, ARITY_TWO};
use crate::value::Value;
use std::rc::Rc;

/// True iff all arguments are pairwise structurally equal.
pub fn builtin_eq(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.is_empty() {
        return Err(LispError::arity_error("=", ARITY_AT_LEAST_ONE, 0));
    }
    Ok(Value::Bool(args.windows(2).all(|pair| pair[0] == pair[1])))
}

fn numeric_pair(function: &str, args: &[Value]) -> Result<(f64, f64)> {
    if args.len() != 2 {
        return Err(LispError::arity_error(function, ARITY_TWO, args.len()));
    }
    let a = match &args[0] {
        Value::Number(n) => n.as_f64(),
        other => return Err(LispError::type_error(function, "a number", other, 1)),
    };
    let b = match &args[1] {
        Value::Number(n) => n.as_f64(),
        other => return Err(LispError::type_error(function, "a number", other, 2)),
    };
    Ok((a, b))
}

pub fn builtin_lt(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    let (a, b) = numeric_pair("<", args)?;
    Ok(Value::Bool(a < b))
}

pub fn builtin_gt(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    let (a, b) = numeric_pair(">", args)?;
    Ok(Value::Bool(a > b))
}

pub fn builtin_le(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    let (a, b) = numeric_pair("<=", args)?;
    Ok(Value::Bool(a <= b))
}

pub fn builtin_ge(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    let (a, b) = numeric_pair(">=", args)?;
    Ok(Value::Bool(a >= b))
}

/// Register all comparison builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define(env, "=", builtin_eq);
    super::define(env, "<", builtin_lt);
    super::define(env, ">", builtin_gt);
    super::define(env, "<=", builtin_le);
    super::define(env, ">=", builtin_ge);
}
