//! String operations: str, subs, string-split, string-trim, string-replace
//!
//! `str` concatenates display forms; the rest operate on string arguments
//! only. Substring indices are character-based.

use crate::env::Environment;
use crate::error::{LispError, Result, ARITY_ONE, ARITY_THREE, ARITY_TWO, ARITY_TWO_OR_THREE};
use crate::value::{Number, Value};
use std::rc::Rc;

fn string_arg<'a>(function: &str, value: &'a Value, position: usize) -> Result<&'a str> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(LispError::type_error(function, "a string", other, position)),
    }
}

fn index_of(function: &str, value: &Value, position: usize) -> Result<usize> {
    match value {
        Value::Number(Number::Int(n)) if *n >= 0 => Ok(*n as usize),
        other => Err(LispError::type_error(
            function,
            "a non-negative integer",
            other,
            position,
        )),
    }
}

/// Concatenates the display forms of all arguments.
pub fn builtin_str(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.display_string());
    }
    Ok(Value::string(out))
}

/// `(subs s start)` or `(subs s start end)`, in characters.
pub fn builtin_subs(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 2 && args.len() != 3 {
        return Err(LispError::arity_error("subs", ARITY_TWO_OR_THREE, args.len()));
    }
    let chars: Vec<char> = string_arg("subs", &args[0], 1)?.chars().collect();
    let start = index_of("subs", &args[1], 2)?;
    let end = match args.get(2) {
        Some(value) => index_of("subs", value, 3)?,
        None => chars.len(),
    };
    if start > end || end > chars.len() {
        return Err(LispError::argument_error(
            "subs",
            format!("range {}..{} out of bounds for length {}", start, end, chars.len()),
        ));
    }
    Ok(Value::string(chars[start..end].iter().collect::<String>()))
}

/// Splits on a separator; an empty separator splits into characters.
pub fn builtin_string_split(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 2 {
        return Err(LispError::arity_error("string-split", ARITY_TWO, args.len()));
    }
    let text = string_arg("string-split", &args[0], 1)?;
    let separator = string_arg("string-split", &args[1], 2)?;
    let pieces: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        text.split(separator).map(Value::string).collect()
    };
    Ok(Value::List(pieces.into_iter().collect()))
}

/// Trims leading and trailing whitespace.
pub fn builtin_string_trim(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("string-trim", ARITY_ONE, args.len()));
    }
    Ok(Value::string(string_arg("string-trim", &args[0], 1)?.trim()))
}

/// Replaces every occurrence of a substring.
pub fn builtin_string_replace(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 3 {
        return Err(LispError::arity_error("string-replace", ARITY_THREE, args.len()));
    }
    let text = string_arg("string-replace", &args[0], 1)?;
    let from = string_arg("string-replace", &args[1], 2)?;
    let to = string_arg("string-replace", &args[2], 3)?;
    if from.is_empty() {
        return Ok(Value::string(text));
    }
    Ok(Value::string(text.replace(from, to)))
}

/// Register all string builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define(env, "str", builtin_str);
    super::define(env, "subs", builtin_subs);
    super::define(env, "substring", builtin_subs);
    super::define(env, "string-split", builtin_string_split);
    super::define(env, "string-trim", builtin_string_trim);
    super::define(env, "string-replace", builtin_string_replace);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::error::ErrorKind;
    use crate::intern;

    fn env() -> Rc<Environment> {
        Environment::new()
    }

    #[test]
    fn test_str_uses_display_forms() {
        let env = env();
        let result = builtin_str(
            &[
                Value::int(1),
                Value::string("a"),
                Value::Keyword(intern::keyword("k")),
                Value::Nil,
            ],
            &env,
        )
        .unwrap();
        assert_eq!(result, Value::string("1a:knil"));
        assert_eq!(builtin_str(&[], &env).unwrap(), Value::string(""));
    }

    #[test]
    fn test_subs_ranges() {
        let env = env();
        let s = Value::string("hello");
        assert_eq!(
            builtin_subs(&[s.clone(), Value::int(1)], &env).unwrap(),
            Value::string("ello")
        );
        assert_eq!(
            builtin_subs(&[s.clone(), Value::int(1), Value::int(3)], &env).unwrap(),
            Value::string("el")
        );
        let err = builtin_subs(&[s, Value::int(3), Value::int(9)], &env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Argument);
    }

    #[test]
    fn test_split_and_empty_separator() {
        let env = env();
        assert_eq!(
            builtin_string_split(&[Value::string("a,b,c"), Value::string(",")], &env)
                .unwrap()
                .to_string(),
            "(\"a\" \"b\" \"c\")"
        );
        assert_eq!(
            builtin_string_split(&[Value::string("ab"), Value::string("")], &env)
                .unwrap()
                .to_string(),
            "(\"a\" \"b\")"
        );
    }

    #[test]
    fn test_trim_and_replace() {
        let env = env();
        assert_eq!(
            builtin_string_trim(&[Value::string("  x \n")], &env).unwrap(),
            Value::string("x")
        );
        assert_eq!(
            builtin_string_replace(
                &[Value::string("a-b-c"), Value::string("-"), Value::string("+")],
                &env
            )
            .unwrap(),
            Value::string("a+b+c")
        );
    }
}
