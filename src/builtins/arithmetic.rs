//! Arithmetic operations: +, -, *, /, %
//!
//! All operators are n-ary except `%`. Arithmetic stays integer while every
//! input is an integer; the first float widens the accumulator. `/` always
//! yields a float.

use crate::env::Environment;
use crate::error::{LispError, Result, ARITY_AT_LEAST_ONE, ARITY_TWO};
use crate::value::{Number, Value};
use std::rc::Rc;

fn number(function: &str, value: &Value, position: usize) -> Result<Number> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(LispError::type_error(function, "a number", other, position)),
    }
}

/// Returns the sum of all arguments (identity: 0).
pub fn builtin_add(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    let mut sum = Number::Int(0);
    for (i, arg) in args.iter().enumerate() {
        sum = sum.add(number("+", arg, i + 1)?);
    }
    Ok(Value::Number(sum))
}

/// Subtracts subsequent arguments from the first; negates a single argument.
pub fn builtin_sub(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.is_empty() {
        return Err(LispError::arity_error("-", ARITY_AT_LEAST_ONE, 0));
    }
    let first = number("-", &args[0], 1)?;
    if args.len() == 1 {
        return Ok(Value::Number(first.neg()));
    }
    let mut result = first;
    for (i, arg) in args[1..].iter().enumerate() {
        result = result.sub(number("-", arg, i + 2)?);
    }
    Ok(Value::Number(result))
}

/// Returns the product of all arguments (identity: 1).
pub fn builtin_mul(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    let mut product = Number::Int(1);
    for (i, arg) in args.iter().enumerate() {
        product = product.mul(number("*", arg, i + 1)?);
    }
    Ok(Value::Number(product))
}

/// Divides the first argument by the rest; a single argument reciprocates.
/// Division always yields a float.
pub fn builtin_div(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.is_empty() {
        return Err(LispError::arity_error("/", ARITY_AT_LEAST_ONE, 0));
    }
    let first = number("/", &args[0], 1)?.as_f64();
    if args.len() == 1 {
        if first == 0.0 {
            return Err(LispError::argument_error("/", "division by zero"));
        }
        return Ok(Value::float(1.0 / first));
    }
    let mut result = first;
    for (i, arg) in args[1..].iter().enumerate() {
        let divisor = number("/", arg, i + 2)?.as_f64();
        if divisor == 0.0 {
            return Err(LispError::argument_error("/", "division by zero"));
        }
        result /= divisor;
    }
    Ok(Value::float(result))
}

/// Integer modulo. Fails on non-integer operands or a zero divisor.
pub fn builtin_mod(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 2 {
        return Err(LispError::arity_error("%", ARITY_TWO, args.len()));
    }
    let a = match &args[0] {
        Value::Number(Number::Int(n)) => *n,
        other => return Err(LispError::type_error("%", "an integer", other, 1)),
    };
    let b = match &args[1] {
        Value::Number(Number::Int(n)) => *n,
        other => return Err(LispError::type_error("%", "an integer", other, 2)),
    };
    if b == 0 {
        return Err(LispError::argument_error("%", "division by zero"));
    }
    Ok(Value::int(a.wrapping_rem(b)))
}

/// Register all arithmetic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define(env, "+", builtin_add);
    super::define(env, "-", builtin_sub);
    super::define(env, "*", builtin_mul);
    super::define(env, "/", builtin_div);
    super::define(env, "%", builtin_mod);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::error::ErrorKind;

    fn env() -> Rc<Environment> {
        Environment::new()
    }

    #[test]
    fn test_add_identity_and_widening() {
        let env = env();
        assert_eq!(builtin_add(&[], &env).unwrap().to_string(), "0");
        assert_eq!(
            builtin_add(&[Value::int(1), Value::int(2), Value::int(3)], &env)
                .unwrap()
                .to_string(),
            "6"
        );
        match builtin_add(&[Value::int(1), Value::float(2.0)], &env).unwrap() {
            Value::Number(Number::Float(f)) => assert_eq!(f, 3.0),
            other => panic!("Expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_sub_unary_negates() {
        let env = env();
        assert_eq!(builtin_sub(&[Value::int(5)], &env).unwrap().to_string(), "-5");
        assert_eq!(
            builtin_sub(&[Value::int(10), Value::int(3), Value::int(2)], &env)
                .unwrap()
                .to_string(),
            "5"
        );
    }

    #[test]
    fn test_mul_identity() {
        let env = env();
        assert_eq!(builtin_mul(&[], &env).unwrap().to_string(), "1");
        assert_eq!(
            builtin_mul(&[Value::int(2), Value::int(3), Value::int(4)], &env)
                .unwrap()
                .to_string(),
            "24"
        );
    }

    #[test]
    fn test_div_always_floats() {
        let env = env();
        match builtin_div(&[Value::int(6), Value::int(2)], &env).unwrap() {
            Value::Number(Number::Float(f)) => assert_eq!(f, 3.0),
            other => panic!("Expected float, got {:?}", other),
        }
        // Unary division reciprocates
        assert_eq!(builtin_div(&[Value::int(4)], &env).unwrap().to_string(), "0.25");
    }

    #[test]
    fn test_division_by_zero() {
        let env = env();
        let err = builtin_div(&[Value::int(1), Value::int(0)], &env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Argument);
        let err = builtin_div(&[Value::int(0)], &env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Argument);
    }

    #[test]
    fn test_mod_requires_integers() {
        let env = env();
        assert_eq!(
            builtin_mod(&[Value::int(17), Value::int(5)], &env)
                .unwrap()
                .to_string(),
            "2"
        );
        let err = builtin_mod(&[Value::float(1.5), Value::int(2)], &env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
        let err = builtin_mod(&[Value::int(1), Value::int(0)], &env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Argument);
    }

    #[test]
    fn test_type_error_positions() {
        let env = env();
        let err = builtin_add(&[Value::int(1), Value::string("x")], &env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: +: expected a number, got string at argument 2"
        );
    }
}
