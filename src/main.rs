// ABOUTME: Process entry point dispatching between script files and the REPL

mod config;
mod highlighter;

use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use highlighter::SkinkHelper;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use skink::interpreter::Interpreter;
use skink::lexer::Scanner;
use skink::parser::Parser;
use skink::report::Reporter;
use skink::resolver::Resolver;
use std::path::PathBuf;
use std::process;

/// A small dynamic scripting language interpreter
#[derive(ClapParser, Debug)]
#[command(name = "skink")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter with closures, arrays, and dictionaries")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            process::exit(0);
        }
        Err(err) => {
            // Anything else is a usage error: wrong arity, unknown flag
            let _ = err.print();
            process::exit(config::EX_USAGE);
        }
    };

    let code = match args.script {
        Some(path) => run_file(&path),
        None => run_repl(),
    };
    process::exit(code);
}

/// Runs one source unit through the pipeline: lex, parse, resolve,
/// evaluate. Each stage is skipped once the reporter has flagged an error.
fn run(source: &str, interpreter: &mut Interpreter, reporter: &mut Reporter) {
    let tokens = Scanner::new(source).scan_tokens(reporter);
    if reporter.had_error {
        return;
    }

    let statements = Parser::new(tokens, reporter).parse();
    if reporter.had_error {
        return;
    }

    Resolver::new(interpreter, reporter).resolve(&statements);
    if reporter.had_error {
        return;
    }

    if let Err(error) = interpreter.interpret(&statements) {
        reporter.runtime_error(&error);
    }
}

/// Script mode: execute the file and map reporter flags to exit codes
fn run_file(path: &PathBuf) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Cannot read script file {}: {}", path.display(), err);
            return config::EX_IOERR;
        }
    };

    let mut reporter = Reporter::new();
    let mut interpreter = Interpreter::new();
    run(&source, &mut interpreter, &mut reporter);

    if reporter.had_error {
        return config::EX_DATAERR;
    }
    if reporter.had_runtime_error {
        return config::EX_SOFTWARE;
    }
    0
}

/// Interactive mode. Global bindings persist across lines; the compile
/// error flag is cleared before each new line so one typo does not
/// poison the session.
fn run_repl() -> i32 {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match Editor::with_config(config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to initialize REPL: {}", err);
            return 1;
        }
    };

    rl.set_helper(Some(SkinkHelper::new()));

    // Try to load history from previous sessions
    let _ = rl.load_history(config::HISTORY_FILE);

    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let mut reporter = Reporter::new();
    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline(config::PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                reporter.reset();
                run(&line, &mut interpreter, &mut reporter);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C clears the line, the session continues
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    // Save history on exit
    let _ = rl.save_history(config::HISTORY_FILE);

    0
}
