// ABOUTME: Evaluator for special forms, application, macros, and loop/recur

use crate::env::Environment;
use crate::error::{
    LispError, Result, ARITY_AT_LEAST_ONE, ARITY_ONE, ARITY_ONE_OR_TWO, ARITY_TWO,
    ARITY_TWO_OR_THREE,
};
use crate::intern;
use crate::parser;
use crate::value::{Lambda, List, Value};
use indexmap::IndexMap;
use std::rc::Rc;

/// Guards runaway recursion in user code before the Rust stack gives out;
/// `loop`/`recur` iterates without consuming depth, so this only bounds
/// nested evaluation.
const MAX_RECURSION_DEPTH: usize = 500;

/// Evaluates one top-level form.
pub fn eval(expr: Value, env: Rc<Environment>) -> Result<Value> {
    let value = eval_at(expr, env, 0)?;
    reject_recur(&value, "the top level")?;
    Ok(value)
}

fn eval_at(expr: Value, env: Rc<Environment>, depth: usize) -> Result<Value> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(LispError::runtime("maximum recursion depth exceeded"));
    }
    match expr {
        // Symbols resolve through the scope chain
        Value::Symbol(ref name) => lookup(name, &env),
        // A non-empty list is a combination; the empty list, like every
        // other variant, evaluates to itself.
        Value::List(ref list) => match list.split_first() {
            Some((head, tail)) => eval_combination(head.clone(), tail, &env, depth),
            None => Ok(expr.clone()),
        },
        other => Ok(other),
    }
}

fn lookup(name: &Rc<str>, env: &Rc<Environment>) -> Result<Value> {
    env.get(name)
        .ok_or_else(|| LispError::name_error(name, &env.suggestions(name)))
}

fn eval_combination(head: Value, tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    if let Value::Symbol(name) = &head {
        match &**name {
            "quote" => return eval_quote(tail),
            "quasiquote" => return eval_quasiquote(tail, env, depth),
            "if" => return eval_if(tail, env, depth),
            "def" => return eval_def(tail, env, depth),
            "fn" => return eval_fn(tail, env),
            "do" => return eval_do(tail, env, depth),
            "let" => return eval_let(tail, env, depth),
            "defmacro" => return eval_defmacro(tail, env),
            "loop" => return eval_loop(tail, env, depth),
            "recur" => return eval_recur(tail, env, depth),
            "load" => return eval_load(tail, env, depth),
            "unquote" | "unquote-splicing" => {
                return Err(LispError::runtime(format!(
                    "{} is only legal inside quasiquote",
                    name
                )));
            }
            _ => {}
        }
    }

    let label = match &head {
        Value::Symbol(name) => Some(name.clone()),
        _ => None,
    };
    let callee = eval_at(head, env.clone(), depth + 1)?;

    if let Value::Macro(mac) = &callee {
        let expansion = expand_macro(
            mac,
            &tail.iter().cloned().collect::<Vec<_>>(),
            label.as_deref().unwrap_or("#<macro>"),
            depth,
        )?;
        return eval_at(expansion, env.clone(), depth + 1);
    }

    // Arguments evaluate strictly left to right
    let mut args = Vec::new();
    for form in tail.iter() {
        let value = eval_at(form.clone(), env.clone(), depth + 1)?;
        reject_recur(&value, "an argument position")?;
        args.push(value);
    }

    apply(callee, &args, env, depth, label.as_deref())
}

/// Applies a function, builtin, or keyword accessor to evaluated arguments.
pub fn apply(
    callee: Value,
    args: &[Value],
    env: &Rc<Environment>,
    depth: usize,
    label: Option<&str>,
) -> Result<Value> {
    match callee {
        Value::Builtin(b) => {
            (b.func)(args, env).map_err(|e| e.in_frame(format!("calling function {}", b.name)))
        }
        Value::Function(f) => {
            let frame = bind_params(&f, args, label.unwrap_or("fn"))?;
            let name = label.unwrap_or("anonymous fn").to_string();
            eval_at(f.body.clone(), frame, depth + 1)
                .map_err(|e| e.in_frame(format!("calling function {}", name)))
        }
        Value::Keyword(k) => keyword_get(&k, args),
        other => Err(LispError::new(
            crate::error::ErrorKind::Type,
            format!("{} is not callable", other.type_name()),
        )),
    }
}

/// Binds declared parameters (and the `&` rest parameter) to arguments in a
/// fresh frame parented to the function's captured environment.
fn bind_params(f: &Lambda, args: &[Value], label: &str) -> Result<Rc<Environment>> {
    let required = f.params.len();
    if f.rest.is_some() {
        if args.len() < required {
            return Err(LispError::arity_error(
                label,
                format!("at least {}", required),
                args.len(),
            ));
        }
    } else if args.len() != required {
        return Err(LispError::arity_error(label, required.to_string(), args.len()));
    }

    let frame = Environment::with_parent(f.env.clone());
    for (param, arg) in f.params.iter().zip(args) {
        frame.define(param.clone(), arg.clone());
    }
    if let Some(rest) = &f.rest {
        let tail: List = args[required..].iter().cloned().collect();
        frame.define(rest.clone(), Value::List(tail));
    }
    Ok(frame)
}

/// `(:k m)` is `(get m :k)`; `(:k m d)` returns d iff the lookup yields nil.
fn keyword_get(keyword: &Rc<str>, args: &[Value]) -> Result<Value> {
    let label = format!(":{}", keyword);
    if args.is_empty() || args.len() > 2 {
        return Err(LispError::arity_error(&label, ARITY_ONE_OR_TWO, args.len()));
    }
    let default = args.get(1).cloned().unwrap_or(Value::Nil);
    match &args[0] {
        Value::Map(entries) => {
            let key = Value::Keyword(keyword.clone());
            match entries.get(&key) {
                Some(Value::Nil) | None => Ok(default),
                Some(value) => Ok(value.clone()),
            }
        }
        Value::Nil => Ok(default),
        other => Err(LispError::type_error(&label, "a hash-map", other, 1)),
    }
}

/// Expands a macro call: bind the UNevaluated argument forms in a frame
/// parented to the macro's captured environment, then evaluate the body.
/// The caller decides what happens to the expansion (`macroexpand` stops
/// here; a live call evaluates it in the caller's environment).
pub fn expand_macro(mac: &Rc<Lambda>, args: &[Value], label: &str, depth: usize) -> Result<Value> {
    let frame = bind_params(mac, args, label)?;
    eval_at(mac.body.clone(), frame, depth + 1)
        .map_err(|e| e.in_frame(format!("expanding macro {}", label)))
}

fn reject_recur(value: &Value, context: &str) -> Result<()> {
    if matches!(value, Value::Recur(_)) {
        return Err(LispError::runtime(format!(
            "recur is only legal in the tail position of loop, not in {}",
            context
        )));
    }
    Ok(())
}

// ===== Special forms =====

fn eval_quote(tail: &List) -> Result<Value> {
    match (tail.first(), tail.rest().is_empty()) {
        (Some(form), true) => Ok(form.clone()),
        _ => Err(LispError::arity_error("quote", ARITY_ONE, tail.len())),
    }
}

fn eval_if(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let forms: Vec<&Value> = tail.iter().collect();
    if forms.len() < 2 || forms.len() > 3 {
        return Err(LispError::arity_error("if", ARITY_TWO_OR_THREE, forms.len()));
    }
    let condition = eval_at(forms[0].clone(), env.clone(), depth + 1)
        .map_err(|e| e.in_frame("evaluating if condition"))?;
    reject_recur(&condition, "an if condition")?;
    if condition.is_truthy() {
        eval_at(forms[1].clone(), env.clone(), depth + 1)
    } else if forms.len() == 3 {
        eval_at(forms[2].clone(), env.clone(), depth + 1)
    } else {
        Ok(Value::Nil)
    }
}

/// `def` always binds in the global frame, even from inside a child frame,
/// and returns the defined symbol.
fn eval_def(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let forms: Vec<&Value> = tail.iter().collect();
    if forms.len() != 2 {
        return Err(LispError::arity_error("def", ARITY_TWO, forms.len()));
    }
    let name = match forms[0] {
        Value::Symbol(name) => name.clone(),
        other => return Err(LispError::type_error("def", "a symbol", other, 1)),
    };
    let value = eval_at(forms[1].clone(), env.clone(), depth + 1)?;
    reject_recur(&value, "a def value")?;
    env.global().define(name.clone(), value);
    Ok(Value::Symbol(name))
}

fn eval_fn(tail: &List, env: &Rc<Environment>) -> Result<Value> {
    let forms: Vec<&Value> = tail.iter().collect();
    if forms.is_empty() {
        return Err(LispError::arity_error("fn", ARITY_AT_LEAST_ONE, 0));
    }
    let (params, rest) = parse_params(forms[0], "fn")?;
    Ok(Value::Function(Rc::new(Lambda {
        params,
        rest,
        body: wrap_body(&forms[1..]),
        env: env.clone(),
    })))
}

fn eval_defmacro(tail: &List, env: &Rc<Environment>) -> Result<Value> {
    let forms: Vec<&Value> = tail.iter().collect();
    if forms.len() < 2 {
        return Err(LispError::arity_error("defmacro", "at least 2", forms.len()));
    }
    let name = match forms[0] {
        Value::Symbol(name) => name.clone(),
        other => return Err(LispError::type_error("defmacro", "a symbol", other, 1)),
    };
    let (params, rest) = parse_params(forms[1], "defmacro")?;
    let mac = Value::Macro(Rc::new(Lambda {
        params,
        rest,
        body: wrap_body(&forms[2..]),
        env: env.clone(),
    }));
    env.global().define(name.clone(), mac);
    Ok(Value::Symbol(name))
}

/// Parameters may be a vector or a list of symbols, with `&` introducing a
/// single rest parameter that binds remaining arguments as a list.
fn parse_params(form: &Value, label: &str) -> Result<(Vec<Rc<str>>, Option<Rc<str>>)> {
    let names: Vec<Value> = match form {
        Value::Vector(items) => items.to_vec(),
        Value::List(items) => items.iter().cloned().collect(),
        other => return Err(LispError::type_error(label, "a parameter vector", other, 1)),
    };
    let mut params = Vec::new();
    let mut rest = None;
    let mut iter = names.iter();
    while let Some(name) = iter.next() {
        match name {
            Value::Symbol(s) if &**s == "&" => match (iter.next(), iter.next()) {
                (Some(Value::Symbol(r)), None) => rest = Some(r.clone()),
                _ => {
                    return Err(LispError::argument_error(
                        label,
                        "expected exactly one symbol after &",
                    ));
                }
            },
            Value::Symbol(s) => params.push(s.clone()),
            other => {
                return Err(LispError::type_error(
                    label,
                    "a symbol parameter",
                    other,
                    params.len() + 1,
                ));
            }
        }
    }
    Ok((params, rest))
}

/// A multi-form body becomes `(do ...)`; an empty body evaluates to nil.
fn wrap_body(forms: &[&Value]) -> Value {
    match forms {
        [] => Value::Nil,
        [single] => (*single).clone(),
        many => {
            let mut items = vec![Value::Symbol(intern::symbol("do"))];
            items.extend(many.iter().map(|form| (*form).clone()));
            Value::list(items)
        }
    }
}

fn eval_do(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let mut result = Value::Nil;
    for form in tail.iter() {
        result = eval_at(form.clone(), env.clone(), depth + 1)?;
    }
    Ok(result)
}

/// Bindings are sequential: each init form sees the bindings before it.
fn read_bindings(form: &Value, label: &str) -> Result<Vec<(Rc<str>, Value)>> {
    let items: Vec<Value> = match form {
        Value::Vector(items) => items.to_vec(),
        other => return Err(LispError::type_error(label, "a binding vector", other, 1)),
    };
    if items.len() % 2 != 0 {
        return Err(LispError::argument_error(
            label,
            "binding vector requires an even number of forms",
        ));
    }
    items
        .chunks(2)
        .map(|pair| match &pair[0] {
            Value::Symbol(name) => Ok((name.clone(), pair[1].clone())),
            other => Err(LispError::type_error(label, "a symbol to bind", other, 1)),
        })
        .collect()
}

fn eval_let(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let forms: Vec<&Value> = tail.iter().collect();
    if forms.is_empty() {
        return Err(LispError::arity_error("let", ARITY_AT_LEAST_ONE, 0));
    }
    let bindings = read_bindings(forms[0], "let")?;
    let frame = Environment::with_parent(env.clone());
    for (name, form) in bindings {
        let value = eval_at(form, frame.clone(), depth + 1)?;
        reject_recur(&value, "a let binding")?;
        frame.define(name, value);
    }
    eval_body(&forms[1..], &frame, depth)
}

fn eval_body(forms: &[&Value], env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let mut result = Value::Nil;
    for form in forms {
        result = eval_at((*form).clone(), env.clone(), depth + 1)?;
    }
    Ok(result)
}

/// The recur trampoline. The loop frame is the recur target: evaluate the
/// body; when its final form produces a Recur sentinel with matching arity,
/// rebind and go again, all without consuming Rust stack.
fn eval_loop(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let forms: Vec<&Value> = tail.iter().collect();
    if forms.is_empty() {
        return Err(LispError::arity_error("loop", ARITY_AT_LEAST_ONE, 0));
    }
    let bindings = read_bindings(forms[0], "loop")?;
    let frame = Environment::with_parent(env.clone());
    let mut names = Vec::with_capacity(bindings.len());
    for (name, form) in bindings {
        let value = eval_at(form, frame.clone(), depth + 1)?;
        reject_recur(&value, "a loop binding")?;
        frame.define(name.clone(), value);
        names.push(name);
    }

    let body = &forms[1..];
    loop {
        // A Recur produced by an intermediate body form is discarded with
        // the rest of that form's value; only the final form re-enters.
        let mut result = Value::Nil;
        for form in body {
            result = eval_at((*form).clone(), frame.clone(), depth + 1)?;
        }
        match result {
            Value::Recur(values) => {
                if values.len() != names.len() {
                    return Err(LispError::arity_error(
                        "recur",
                        names.len().to_string(),
                        values.len(),
                    ));
                }
                for (name, value) in names.iter().zip(values.iter()) {
                    frame.define(name.clone(), value.clone());
                }
            }
            value => return Ok(value),
        }
    }
}

fn eval_recur(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let mut values = Vec::new();
    for form in tail.iter() {
        let value = eval_at(form.clone(), env.clone(), depth + 1)?;
        reject_recur(&value, "an argument position")?;
        values.push(value);
    }
    Ok(Value::Recur(Rc::new(values)))
}

/// `(load path)` reads every form from the file and evaluates it in the
/// current environment, returning nil.
fn eval_load(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    let forms: Vec<&Value> = tail.iter().collect();
    if forms.len() != 1 {
        return Err(LispError::arity_error("load", ARITY_ONE, forms.len()));
    }
    let path = match eval_at(forms[0].clone(), env.clone(), depth + 1)? {
        Value::String(path) => path,
        other => return Err(LispError::type_error("load", "a string path", &other, 1)),
    };
    let source = std::fs::read_to_string(&*path)
        .map_err(|e| LispError::io_error("load", &path, &e))?;
    for form in parser::parse_all(&source, &path)? {
        let value = eval_at(form, env.clone(), depth + 1)
            .map_err(|e| e.in_frame(format!("loading file {}", path)))?;
        reject_recur(&value, "a top-level form")?;
    }
    Ok(Value::Nil)
}

// ===== Quasiquote =====

fn eval_quasiquote(tail: &List, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    match (tail.first(), tail.rest().is_empty()) {
        (Some(form), true) => quasiquote(form, 1, env, depth),
        _ => Err(LispError::arity_error("quasiquote", ARITY_ONE, tail.len())),
    }
}

fn expect_one<'a>(tail: &'a List, label: &str) -> Result<&'a Value> {
    match (tail.first(), tail.rest().is_empty()) {
        (Some(form), true) => Ok(form),
        _ => Err(LispError::arity_error(label, ARITY_ONE, tail.len())),
    }
}

/// Walks a quasiquote template. `level` counts enclosing quasiquotes; an
/// unquote only evaluates at level 1, and nested templates are rebuilt.
fn quasiquote(form: &Value, level: u32, env: &Rc<Environment>, depth: usize) -> Result<Value> {
    match form {
        Value::List(items) => {
            if let Some((head, tail)) = items.split_first() {
                if let Value::Symbol(name) = head {
                    match &**name {
                        "unquote" => {
                            let arg = expect_one(tail, "unquote")?;
                            if level == 1 {
                                return eval_at(arg.clone(), env.clone(), depth + 1);
                            }
                            let inner = quasiquote(arg, level - 1, env, depth)?;
                            return Ok(Value::list(vec![
                                Value::Symbol(intern::symbol("unquote")),
                                inner,
                            ]));
                        }
                        "unquote-splicing" if level == 1 => {
                            return Err(LispError::runtime(
                                "unquote-splicing is only legal inside a sequence",
                            ));
                        }
                        "quasiquote" => {
                            let arg = expect_one(tail, "quasiquote")?;
                            let inner = quasiquote(arg, level + 1, env, depth)?;
                            return Ok(Value::list(vec![
                                Value::Symbol(intern::symbol("quasiquote")),
                                inner,
                            ]));
                        }
                        _ => {}
                    }
                }
                let expanded = quasiquote_seq(items.iter(), level, env, depth)?;
                Ok(Value::list(expanded))
            } else {
                Ok(form.clone())
            }
        }
        Value::Vector(items) => {
            let expanded = quasiquote_seq(items.iter(), level, env, depth)?;
            Ok(Value::vector(expanded))
        }
        Value::Map(entries) => {
            let mut out = IndexMap::new();
            for (key, value) in entries.iter() {
                out.insert(
                    quasiquote(key, level, env, depth)?,
                    quasiquote(value, level, env, depth)?,
                );
            }
            Ok(Value::Map(Rc::new(out)))
        }
        _ => Ok(form.clone()),
    }
}

/// Elements of a quasiquoted sequence, splicing `~@` expansions in place.
fn quasiquote_seq<'a>(
    items: impl Iterator<Item = &'a Value>,
    level: u32,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    for item in items {
        if level == 1 {
            if let Value::List(parts) = item {
                if let Some((head, tail)) = parts.split_first() {
                    if matches!(head, Value::Symbol(s) if &**s == "unquote-splicing") {
                        let arg = expect_one(tail, "unquote-splicing")?;
                        match eval_at(arg.clone(), env.clone(), depth + 1)? {
                            Value::List(spliced) => out.extend(spliced.iter().cloned()),
                            Value::Vector(spliced) => out.extend(spliced.iter().cloned()),
                            other => {
                                return Err(LispError::type_error(
                                    "unquote-splicing",
                                    "a sequence",
                                    &other,
                                    1,
                                ));
                            }
                        }
                        continue;
                    }
                }
            }
        }
        out.push(quasiquote(item, level, env, depth)?);
    }
    Ok(out)
}
