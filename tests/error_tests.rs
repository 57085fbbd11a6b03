// ABOUTME: Tests for the error taxonomy, locations, traces, and suggestions

use rlisp::error::ErrorKind;
use rlisp::interpreter::Interpreter;

fn interpreter() -> Interpreter {
    let interpreter = Interpreter::new();
    interpreter
        .eval_source(include_str!("../lisp/stdlib/core.lisp"), "core.lisp")
        .expect("core stdlib should load");
    interpreter
}

fn fail(interpreter: &Interpreter, source: &str) -> rlisp::error::LispError {
    interpreter
        .eval_source(source, "<repl>")
        .expect_err(source)
}

#[test]
fn test_name_error_with_suggestion() {
    let interp = interpreter();
    let err = fail(&interp, "(fitler even? '(1 2))");
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(err.message.contains("undefined symbol 'fitler'"));
    assert!(err.message.contains("did you mean"));
    assert!(err.message.contains("filter"));
}

#[test]
fn test_name_error_without_close_match() {
    let interp = interpreter();
    let err = fail(&interp, "zzzz");
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(!err.message.contains("did you mean"));
}

#[test]
fn test_arity_errors() {
    let interp = interpreter();
    assert_eq!(fail(&interp, "((fn [x] x) 1 2)").kind, ErrorKind::Arity);
    assert_eq!(fail(&interp, "(quote a b)").kind, ErrorKind::Arity);
    assert_eq!(fail(&interp, "(if true)").kind, ErrorKind::Arity);
    assert_eq!(fail(&interp, "(def x)").kind, ErrorKind::Arity);
}

#[test]
fn test_type_errors() {
    let interp = interpreter();
    let err = fail(&interp, "(+ 1 \"two\")");
    assert_eq!(err.kind, ErrorKind::Type);
    assert_eq!(err.message, "+: expected a number, got string at argument 2");

    assert_eq!(fail(&interp, "(42 1)").kind, ErrorKind::Type);
    assert_eq!(fail(&interp, "(first 42)").kind, ErrorKind::Type);
}

#[test]
fn test_argument_errors() {
    let interp = interpreter();
    assert_eq!(fail(&interp, "(/ 1 0)").kind, ErrorKind::Argument);
    assert_eq!(fail(&interp, "(% 1 0)").kind, ErrorKind::Argument);
    assert_eq!(fail(&interp, "(nth '(1 2) 9)").kind, ErrorKind::Argument);
}

#[test]
fn test_parse_errors_are_located_with_file_name() {
    let interp = interpreter();
    let err = fail(&interp, "(+ 1");
    assert_eq!(err.kind, ErrorKind::Parse);
    let location = err.location.expect("parse errors carry a location");
    assert_eq!(&*location.file, "<repl>");
    assert_eq!((location.line, location.column), (1, 1));

    assert_eq!(fail(&interp, "\"unterminated").kind, ErrorKind::Parse);
    assert_eq!(fail(&interp, "{:a 1 :b}").kind, ErrorKind::Parse);
    assert_eq!(fail(&interp, ")").kind, ErrorKind::Parse);
}

#[test]
fn test_runtime_errors() {
    let interp = interpreter();
    let err = fail(&interp, "(throw \"boom\")");
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.message, "boom");

    assert_eq!(fail(&interp, "(recur 1)").kind, ErrorKind::Runtime);
    assert_eq!(fail(&interp, "~x").kind, ErrorKind::Runtime);
}

#[test]
fn test_recur_arity_mismatch_is_terminal() {
    let interp = interpreter();
    let err = fail(&interp, "(loop [a 1 b 2] (recur 1))");
    assert_eq!(err.kind, ErrorKind::Arity);
    assert!(err.message.contains("recur"));
}

#[test]
fn test_io_errors() {
    let interp = interpreter();
    let err = fail(&interp, "(slurp \"/definitely/not/a/real/file\")");
    assert_eq!(err.kind, ErrorKind::Io);
    assert!(err.message.starts_with("slurp:"));

    assert_eq!(
        fail(&interp, "(load \"/definitely/not/a/real/file\")").kind,
        ErrorKind::Io
    );
}

#[test]
fn test_trace_accumulates_call_frames() {
    let interp = interpreter();
    interp
        .eval_source(
            "(def inner (fn [] (missing-thing)))
             (def outer (fn [] (inner)))",
            "<repl>",
        )
        .expect("definitions should evaluate");
    let err = fail(&interp, "(outer)");
    assert_eq!(err.kind, ErrorKind::Name);
    let innermost = err
        .trace
        .iter()
        .position(|f| f == "calling function inner")
        .expect("trace should name inner");
    let outermost = err
        .trace
        .iter()
        .position(|f| f == "calling function outer")
        .expect("trace should name outer");
    assert!(innermost < outermost, "frames accumulate innermost first");

    let rendered = err.render();
    assert!(rendered.starts_with("NameError:"));
    assert!(rendered.contains("while calling function outer"));
}

#[test]
fn test_macro_expansion_failures_name_the_macro() {
    let interp = interpreter();
    interp
        .eval_source("(defmacro broken [] (undefined-helper))", "<repl>")
        .expect("definition should evaluate");
    let err = fail(&interp, "(broken)");
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(err.trace.iter().any(|f| f == "expanding macro broken"));
}

#[test]
fn test_special_form_shape_errors_name_the_form() {
    let interp = interpreter();
    let err = fail(&interp, "(let (x 1) x)");
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.starts_with("let:"));

    let err = fail(&interp, "(loop [x] x)");
    assert_eq!(err.kind, ErrorKind::Argument);
    assert!(err.message.starts_with("loop:"));

    let err = fail(&interp, "(fn 7 x)");
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.starts_with("fn:"));
}
