//! Type predicates: symbol?, keyword?, number?, string?, nil?, list?,
//! vector?, hash-map?, set?, fn?

use crate::env::Environment;
use crate::error::{LispError, Result, ARITY_ONE};
use crate::value::Value;
use std::rc::Rc;

fn check_one<'a>(function: &str, args: &'a [Value]) -> Result<&'a Value> {
    match args {
        [value] => Ok(value),
        _ => Err(LispError::arity_error(function, ARITY_ONE, args.len())),
    }
}

pub fn builtin_symbol_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("symbol?", args)?, Value::Symbol(_))))
}

pub fn builtin_keyword_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("keyword?", args)?, Value::Keyword(_))))
}

pub fn builtin_number_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("number?", args)?, Value::Number(_))))
}

pub fn builtin_string_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("string?", args)?, Value::String(_))))
}

pub fn builtin_nil_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("nil?", args)?, Value::Nil)))
}

pub fn builtin_list_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("list?", args)?, Value::List(_))))
}

pub fn builtin_vector_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("vector?", args)?, Value::Vector(_))))
}

pub fn builtin_hash_map_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("hash-map?", args)?, Value::Map(_))))
}

pub fn builtin_set_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(check_one("set?", args)?, Value::Set(_))))
}

/// True for user functions and builtins; macros are not functions.
pub fn builtin_fn_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::Bool(matches!(
        check_one("fn?", args)?,
        Value::Function(_) | Value::Builtin(_)
    )))
}

/// Register all type predicates in the environment
pub fn register(env: &Rc<Environment>) {
    super::define(env, "symbol?", builtin_symbol_q);
    super::define(env, "keyword?", builtin_keyword_q);
    super::define(env, "number?", builtin_number_q);
    super::define(env, "string?", builtin_string_q);
    super::define(env, "nil?", builtin_nil_q);
    super::define(env, "list?", builtin_list_q);
    super::define(env, "vector?", builtin_vector_q);
    super::define(env, "hash-map?", builtin_hash_map_q);
    super::define(env, "set?", builtin_set_q);
    super::define(env, "fn?", builtin_fn_q);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::env::Environment;
    use crate::intern;

    #[test]
    fn test_predicates_match_their_variant() {
        let env = Environment::new();
        register_builtins(&env);

        assert_eq!(
            builtin_symbol_q(&[Value::Symbol(intern::symbol("x"))], &env).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_keyword_q(&[Value::Symbol(intern::symbol("x"))], &env).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(builtin_nil_q(&[Value::Nil], &env).unwrap(), Value::Bool(true));
        assert_eq!(
            builtin_list_q(&[Value::list(vec![])], &env).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_list_q(&[Value::vector(vec![])], &env).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_fn_q_counts_builtins_but_not_macros() {
        let env = Environment::new();
        register_builtins(&env);

        let plus = env.get("+").expect("+ should be registered");
        assert_eq!(builtin_fn_q(&[plus], &env).unwrap(), Value::Bool(true));
        assert_eq!(builtin_fn_q(&[Value::int(1)], &env).unwrap(), Value::Bool(false));
    }
}
