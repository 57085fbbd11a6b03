// ABOUTME: CLI entry point: REPL, script mode, and -e expression mode

use clap::Parser;
use rlisp::error::LispError;
use rlisp::interpreter::Interpreter;
use rlisp::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// A Clojure-flavored Lisp interpreter
#[derive(Parser, Debug)]
#[command(name = "rlisp")]
#[command(version)]
#[command(about = "A Clojure-flavored Lisp interpreter with macros and loop/recur")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE", conflicts_with = "eval")]
    script: Option<PathBuf>,

    /// Script file to execute (same as the positional FILE)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATH",
        conflicts_with_all = ["script", "eval"]
    )]
    file: Option<PathBuf>,

    /// Evaluate an expression, print its result unless nil, and exit
    #[arg(short = 'e', long = "eval", value_name = "EXPR")]
    eval: Option<String>,

    /// Skip loading the standard library
    #[arg(long = "no-stdlib")]
    no_stdlib: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let interpreter = if args.no_stdlib {
        Interpreter::new()
    } else {
        Interpreter::with_stdlib()
    };

    if let Some(expr) = args.eval {
        return run_expr(&interpreter, &expr);
    }
    if let Some(path) = args.file.or(args.script) {
        return run_script(&interpreter, &path);
    }
    run_repl(&interpreter)
}

fn report(error: &LispError) {
    eprintln!("{}", error.render());
}

/// `-e` mode: the expression is wrapped in `(do ...)` so several forms work.
fn run_expr(interpreter: &Interpreter, expr: &str) -> ExitCode {
    let wrapped = format!("(do {})", expr);
    match interpreter.eval_source(&wrapped, "<eval>") {
        Ok(Value::Nil) => ExitCode::SUCCESS,
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run_script(interpreter: &Interpreter, path: &Path) -> ExitCode {
    match interpreter.eval_file(path) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(interpreter: &Interpreter) -> ExitCode {
    println!("rlisp v{}", env!("CARGO_PKG_VERSION"));
    println!("A Clojure-flavored Lisp. Type exit or Ctrl-D to leave.");

    let config = Config::builder().auto_add_history(true).build();
    let mut editor = match DefaultEditor::with_config(config) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let history_file = ".rlisp_history";
    let _ = editor.load_history(history_file);

    loop {
        match editor.readline("rlisp> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if matches!(trimmed, "exit" | "quit" | "(exit)" | "(quit)") {
                    println!("Goodbye!");
                    break;
                }
                match interpreter.eval_source(&line, "<repl>") {
                    Ok(value) => println!("=> {}", value),
                    Err(e) => report(&e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    let _ = editor.save_history(history_file);
    ExitCode::SUCCESS
}
