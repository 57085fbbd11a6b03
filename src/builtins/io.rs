//! Console and file system operations
//!
//! `println` prints display forms, `prn` prints readable forms. File
//! access is blocking and synchronous; failures surface as IOError and no
//! handles persist across calls.

use crate::env::Environment;
use crate::error::{LispError, Result, ARITY_ONE, ARITY_TWO};
use crate::value::Value;
use std::rc::Rc;

fn string_arg<'a>(function: &str, value: &'a Value, position: usize) -> Result<&'a str> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(LispError::type_error(function, "a string", other, position)),
    }
}

fn joined(args: &[Value], readably: bool) -> String {
    args.iter()
        .map(|v| {
            if readably {
                v.print_string()
            } else {
                v.display_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints display forms, space-separated, with a trailing newline.
pub fn builtin_println(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    println!("{}", joined(args, false));
    Ok(Value::Nil)
}

/// Prints readable forms, space-separated, with a trailing newline.
pub fn builtin_prn(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    println!("{}", joined(args, true));
    Ok(Value::Nil)
}

/// Readable forms joined with spaces, as a string.
pub fn builtin_pr_str(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    Ok(Value::string(joined(args, true)))
}

/// Reads an entire file into a string.
pub fn builtin_slurp(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("slurp", ARITY_ONE, args.len()));
    }
    let path = string_arg("slurp", &args[0], 1)?;
    let contents =
        std::fs::read_to_string(path).map_err(|e| LispError::io_error("slurp", path, &e))?;
    Ok(Value::string(contents))
}

/// Writes a string to a file, replacing any existing contents.
pub fn builtin_spit(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 2 {
        return Err(LispError::arity_error("spit", ARITY_TWO, args.len()));
    }
    let path = string_arg("spit", &args[0], 1)?;
    let contents = string_arg("spit", &args[1], 2)?;
    std::fs::write(path, contents).map_err(|e| LispError::io_error("spit", path, &e))?;
    Ok(Value::Nil)
}

pub fn builtin_file_exists_q(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("file-exists?", ARITY_ONE, args.len()));
    }
    let path = string_arg("file-exists?", &args[0], 1)?;
    Ok(Value::Bool(std::path::Path::new(path).exists()))
}

/// Directory entry names as a sorted list of strings.
pub fn builtin_list_dir(args: &[Value], _env: &Rc<Environment>) -> Result<Value> {
    if args.len() != 1 {
        return Err(LispError::arity_error("list-dir", ARITY_ONE, args.len()));
    }
    let path = string_arg("list-dir", &args[0], 1)?;
    let entries =
        std::fs::read_dir(path).map_err(|e| LispError::io_error("list-dir", path, &e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LispError::io_error("list-dir", path, &e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(Value::List(names.into_iter().map(Value::string).collect()))
}

/// Register all io builtins in the environment
pub fn register(env: &Rc<Environment>) {
    super::define(env, "println", builtin_println);
    super::define(env, "prn", builtin_prn);
    super::define(env, "pr-str", builtin_pr_str);
    super::define(env, "slurp", builtin_slurp);
    super::define(env, "spit", builtin_spit);
    super::define(env, "file-exists?", builtin_file_exists_q);
    super::define(env, "list-dir", builtin_list_dir);
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

    fn temp_path(stem: &str) -> (String, std::path::PathBuf) {
        let unique = format!("rlisp-{}-{}", stem, &*intern::gensym("t"));
        let path = std::env::temp_dir().join(unique);
        (path.to_string_lossy().into_owned(), path)
    }

    #[test]
    fn test_pr_str_quotes_strings() {
        let env = env();
        let result = builtin_pr_str(&[Value::string("a b"), Value::int(1)], &env).unwrap();
        assert_eq!(result, Value::string("\"a b\" 1"));
    }

    #[test]
    fn test_spit_then_slurp_round_trips() {
        let env = env();
        let (path, path_buf) = temp_path("spit");
        builtin_spit(&[Value::string(path.clone()), Value::string("line one\n")], &env)
            .expect("spit should succeed");
        let contents = builtin_slurp(&[Value::string(path.clone())], &env).unwrap();
        assert_eq!(contents, Value::string("line one\n"));

        assert_eq!(
            builtin_file_exists_q(&[Value::string(path)], &env).unwrap(),
            Value::Bool(true)
        );
        std::fs::remove_file(path_buf).ok();
    }

    #[test]
    fn test_slurp_missing_file_is_io_error() {
        let env = env();
        let (path, _) = temp_path("missing");
        let err = builtin_slurp(&[Value::string(path)], &env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.message.starts_with("slurp:"));
    }

    #[test]
    fn test_spit_requires_a_string_body() {
        let env = env();
        let (path, _) = temp_path("typed");
        let err = builtin_spit(&[Value::string(path), Value::int(1)], &env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_list_dir_sorts_entries() {
        let env = env();
        let (dir, dir_buf) = temp_path("dir");
        std::fs::create_dir(&dir_buf).expect("mkdir should succeed");
        std::fs::write(dir_buf.join("b.txt"), "").unwrap();
        std::fs::write(dir_buf.join("a.txt"), "").unwrap();

        let listing = builtin_list_dir(&[Value::string(dir)], &env).unwrap();
        assert_eq!(listing.to_string(), "(\"a.txt\" \"b.txt\")");
        std::fs::remove_dir_all(dir_buf).ok();
    }
}
