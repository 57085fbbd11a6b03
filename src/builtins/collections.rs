//! Collection operations over lists, vectors, hash-maps, and sets
//!
//! Everything here is persistent: update operations return new collections
//! and never mutate their arguments. Hash-maps and sets preserve insertion
//! order.

use crate::env::Environment;
use crate::error::{
    LispError, Result, ARITY_AT_LEAST_ONE, ARITY_ONE, ARITY_TWO, ARITY_TWO_OR_THREE,
};
use crate::value::{List, Number, Value};
use indexmap::{IndexMap, IndexSet};
use std::rc::Rc;

fn check_arity(function: &str, expected: &str, ok: bool, actual: usize) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(LispError::arity_error(function, expected, actual))
    }
}

/// The elements of a sequence argument. nil counts as the empty sequence.
fn seq_items(function: &str, value: &Value, position: usize) -> Result<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.iter().cloned().collect()),
        Value::Vector(items) => Ok(items.to_vec()),
        Value::Set(items) => Ok(items.iter().cloned().collect()),
        Value::Nil => Ok(Vec::new()),
        other => Err(LispError::type_error(function, "a sequence", other, position)),
    }
}

fn map_arg<'a>(
    function: &str,
    value: &'a Value,
    position: usize,
) -> Result<&'a IndexMap<Value, Value>> {
    match value {
        Value::Map(entries) => Ok(entries),
        other => Err(LispError::type_error(function, "a hash-map", other, position)),
    }
}

fn set_arg<'a>(function: &str, value: &'a Value, position: usize) -> Result<&'a IndexSet<Value>> {
    match value {
        Value::Set(items) => Ok(items),
        other => Err(LispError::type_error(function, "a set", other, position)),
    }
}

fn index_arg(function: &str, value: &Value, position: usize) -> Result<i64> {
    match value {
        Value::Number(Number::Int(n)) => Ok(*n),
        other => Err(LispError::type_error(function, "an integer index", other, position)),
    }
}

/// Creates a list of the arguments in order.
pub fn builtin_list(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::List(args.iter().cloned().collect()))
}

/// Creates a vector of the arguments in order.
pub fn builtin_vector(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::vector(args.to_vec()))
}

/// Creates a hash-map from alternating keys and values.
pub fn builtin_hash_map(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("hash-map", "an even number of", args.len() % 2 == 0, args.len())?;
    let mut entries = IndexMap::new();
    for pair in args.chunks(2) {
        entries.insert(pair[0].clone(), pair[1].clone());
    }
    Ok(Value::Map(Rc::new(entries)))
}

/// Converts a sequence to a set; duplicate elements collapse.
pub fn builtin_set(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("set", ARITY_ONE, args.len() == 1, args.len())?;
    let items = seq_items("set", &args[0], 1)?;
    Ok(Value::Set(Rc::new(items.into_iter().collect())))
}

/// Prepends an element. The new list shares the old list as its tail.
pub fn builtin_cons(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("cons", ARITY_TWO, args.len() == 2, args.len())?;
    let tail: List = match &args[1] {
        Value::List(items) => items.clone(),
        Value::Vector(items) => items.iter().cloned().collect(),
        Value::Nil => List::new(),
        other => return Err(LispError::type_error("cons", "a sequence", other, 2)),
    };
    Ok(Value::List(tail.cons(args[0].clone())))
}

/// First element of a sequence, or nil when empty.
pub fn builtin_first(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("first", ARITY_ONE, args.len() == 1, args.len())?;
    match &args[0] {
        Value::List(items) => Ok(items.first().cloned().unwrap_or(Value::Nil)),
        Value::Vector(items) => Ok(items.first().cloned().unwrap_or(Value::Nil)),
        Value::Nil => Ok(Value::Nil),
        other => Err(LispError::type_error("first", "a sequence", other, 1)),
    }
}

/// Everything but the first element, always as a list; empty in, empty out.
pub fn builtin_rest(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("rest", ARITY_ONE, args.len() == 1, args.len())?;
    match &args[0] {
        Value::List(items) => Ok(Value::List(items.rest())),
        Value::Vector(items) => Ok(Value::List(
            items.iter().skip(1).cloned().collect::<List>(),
        )),
        Value::Nil => Ok(Value::List(List::new())),
        other => Err(LispError::type_error("rest", "a sequence", other, 1)),
    }
}

/// Number of elements (characters for a string); nil counts 0.
pub fn builtin_count(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("count", ARITY_ONE, args.len() == 1, args.len())?;
    let count = match &args[0] {
        Value::List(items) => items.len(),
        Value::Vector(items) => items.len(),
        Value::Map(entries) => entries.len(),
        Value::Set(items) => items.len(),
        Value::String(s) => s.chars().count(),
        Value::Nil => 0,
        other => return Err(LispError::type_error("count", "a collection", other, 1)),
    };
    Ok(Value::int(count as i64))
}

/// True when the collection has no elements.
pub fn builtin_empty_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("empty?", ARITY_ONE, args.len() == 1, args.len())?;
    let empty = match &args[0] {
        Value::List(items) => items.is_empty(),
        Value::Vector(items) => items.is_empty(),
        Value::Map(entries) => entries.is_empty(),
        Value::Set(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Nil => true,
        other => return Err(LispError::type_error("empty?", "a collection", other, 1)),
    };
    Ok(Value::Bool(empty))
}

/// Indexed access with an optional default; out of bounds without a default
/// is an error.
pub fn builtin_nth(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("nth", ARITY_TWO_OR_THREE, args.len() == 2 || args.len() == 3, args.len())?;
    let index = index_arg("nth", &args[1], 2)?;
    let items: Vec<Value> = match &args[0] {
        Value::List(items) => items.iter().cloned().collect(),
        Value::Vector(items) => items.to_vec(),
        other => return Err(LispError::type_error("nth", "a sequence", other, 1)),
    };
    if index >= 0 {
        if let Some(value) = items.get(index as usize) {
            return Ok(value.clone());
        }
    }
    match args.get(2) {
        Some(default) => Ok(default.clone()),
        None => Err(LispError::argument_error(
            "nth",
            format!("index {} out of bounds for length {}", index, items.len()),
        )),
    }
}

/// Adds elements to a collection: lists prepend, vectors append, sets
/// insert. nil conjoins as a list.
pub fn builtin_conj(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("conj", "at least 2", args.len() >= 2, args.len())?;
    let mut target = match &args[0] {
        Value::Nil => Value::List(List::new()),
        other => other.clone(),
    };
    for value in &args[1..] {
        target = match target {
            Value::List(items) => Value::List(items.cons(value.clone())),
            Value::Vector(items) => {
                let mut items = items.to_vec();
                items.push(value.clone());
                Value::vector(items)
            }
            Value::Set(items) => {
                let mut items = (*items).clone();
                items.insert(value.clone());
                Value::Set(Rc::new(items))
            }
            other => return Err(LispError::type_error("conj", "a collection", &other, 1)),
        };
    }
    Ok(target)
}

/// Lookup in a map (by key) or vector (by index), with an optional default
/// returned iff the lookup yields nil.
pub fn builtin_get(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("get", ARITY_TWO_OR_THREE, args.len() == 2 || args.len() == 3, args.len())?;
    let default = args.get(2).cloned().unwrap_or(Value::Nil);
    let found = match &args[0] {
        Value::Map(entries) => entries.get(&args[1]).cloned(),
        Value::Vector(items) => {
            let index = index_arg("get", &args[1], 2)?;
            if index >= 0 {
                items.get(index as usize).cloned()
            } else {
                None
            }
        }
        Value::Set(items) => items.get(&args[1]).cloned(),
        Value::Nil => None,
        other => return Err(LispError::type_error("get", "a hash-map or vector", other, 1)),
    };
    match found {
        Some(Value::Nil) | None => Ok(default),
        Some(value) => Ok(value),
    }
}

/// Returns a new map with the given keys associated to the given values,
/// applied in textual order.
pub fn builtin_assoc(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity(
        "assoc",
        "an odd number of",
        args.len() >= 3 && args.len() % 2 == 1,
        args.len(),
    )?;
    let mut entries = map_arg("assoc", &args[0], 1)?.clone();
    for pair in args[1..].chunks(2) {
        entries.insert(pair[0].clone(), pair[1].clone());
    }
    Ok(Value::Map(Rc::new(entries)))
}

/// Returns a new map without the given keys; remaining entries keep their
/// insertion order.
pub fn builtin_dissoc(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("dissoc", ARITY_AT_LEAST_ONE, !args.is_empty(), args.len())?;
    let mut entries = map_arg("dissoc", &args[0], 1)?.clone();
    for key in &args[1..] {
        entries.shift_remove(key);
    }
    Ok(Value::Map(Rc::new(entries)))
}

/// Membership: a key in a map, an element in a set, or an index in a
/// vector's range.
pub fn builtin_contains_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("contains?", ARITY_TWO, args.len() == 2, args.len())?;
    let found = match &args[0] {
        Value::Map(entries) => entries.contains_key(&args[1]),
        Value::Set(items) => items.contains(&args[1]),
        Value::Vector(items) => {
            let index = index_arg("contains?", &args[1], 2)?;
            index >= 0 && (index as usize) < items.len()
        }
        Value::Nil => false,
        other => {
            return Err(LispError::type_error(
                "contains?",
                "a hash-map, set, or vector",
                other,
                1,
            ));
        }
    };
    Ok(Value::Bool(found))
}

/// Map keys as a list, in insertion order.
pub fn builtin_keys(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("keys", ARITY_ONE, args.len() == 1, args.len())?;
    let entries = map_arg("keys", &args[0], 1)?;
    Ok(Value::List(entries.keys().cloned().collect()))
}

/// Map values as a list, in insertion order.
pub fn builtin_vals(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("vals", ARITY_ONE, args.len() == 1, args.len())?;
    let entries = map_arg("vals", &args[0], 1)?;
    Ok(Value::List(entries.values().cloned().collect()))
}

/// Builds a map from a sequence of keys and a sequence of values, stopping
/// at the shorter one.
pub fn builtin_zipmap(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("zipmap", ARITY_TWO, args.len() == 2, args.len())?;
    let keys = seq_items("zipmap", &args[0], 1)?;
    let values = seq_items("zipmap", &args[1], 2)?;
    let mut entries = IndexMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        entries.insert(key, value);
    }
    Ok(Value::Map(Rc::new(entries)))
}

/// Union of one or more sets.
pub fn builtin_union(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("union", ARITY_AT_LEAST_ONE, !args.is_empty(), args.len())?;
    let mut result = set_arg("union", &args[0], 1)?.clone();
    for (i, arg) in args[1..].iter().enumerate() {
        for item in set_arg("union", arg, i + 2)? {
            result.insert(item.clone());
        }
    }
    Ok(Value::Set(Rc::new(result)))
}

/// Intersection of one or more sets.
pub fn builtin_intersection(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("intersection", ARITY_AT_LEAST_ONE, !args.is_empty(), args.len())?;
    let mut result = set_arg("intersection", &args[0], 1)?.clone();
    for (i, arg) in args[1..].iter().enumerate() {
        let other = set_arg("intersection", arg, i + 2)?;
        result.retain(|item| other.contains(item));
    }
    Ok(Value::Set(Rc::new(result)))
}

/// Elements of the first set not present in any of the rest.
pub fn builtin_difference(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("difference", ARITY_AT_LEAST_ONE, !args.is_empty(), args.len())?;
    let mut result = set_arg("difference", &args[0], 1)?.clone();
    for (i, arg) in args[1..].iter().enumerate() {
        let other = set_arg("difference", arg, i + 2)?;
        result.retain(|item| !other.contains(item));
    }
    Ok(Value::Set(Rc::new(result)))
}

/// True when every element of the first set is in the second.
pub fn builtin_subset_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("subset?", ARITY_TWO, args.len() == 2, args.len())?;
    let a = set_arg("subset?", &args[0], 1)?;
    let b = set_arg("subset?", &args[1], 2)?;
    Ok(Value::Bool(a.iter().all(|item| b.contains(item))))
}

/// True when the first set contains every element of the second.
pub fn builtin_superset_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    check_arity("superset?", ARITY_TWO, args.len() == 2, args.len())?;
    let a = set_arg("superset?", &args[0], 1)?;
    let b = set_arg("superset?", &args[1], 2)?;
    Ok(Value::Bool(b.iter().all(|item| a.contains(item))))
}

/// Register all collection builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define(env, "list", builtin_list);
    super::define(env, "vector", builtin_vector);
    super::define(env, "hash-map", builtin_hash_map);
    super::define(env, "set", builtin_set);
    super::define(env, "cons", builtin_cons);
    super::define(env, "first", builtin_first);
    super::define(env, "rest", builtin_rest);
    super::define(env, "count", builtin_count);
    super::define(env, "length", builtin_count);
    super::define(env, "empty?", builtin_empty_q);
    super::define(env, "nth", builtin_nth);
    super::define(env, "conj", builtin_conj);
    super::define(env, "get", builtin_get);
    super::define(env, "assoc", builtin_assoc);
    super::define(env, "dissoc", builtin_dissoc);
    super::define(env, "contains?", builtin_contains_q);
    super::define(env, "keys", builtin_keys);
    super::define(env, "vals", builtin_vals);
    super::define(env, "zipmap", builtin_zipmap);
    super::define(env, "union", builtin_union);
    super::define(env, "intersection", builtin_intersection);
    super::define(env, "difference", builtin_difference);
    super::define(env, "subset?", builtin_subset_q);
    super::define(env, "superset?", builtin_superset_q);
}
