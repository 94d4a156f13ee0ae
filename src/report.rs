// ABOUTME: Diagnostic reporter collecting scan, parse, resolve, and runtime errors

use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};

/// Sink for diagnostics from every pipeline stage.
///
/// Stages accumulate errors here instead of aborting; the host checks the
/// flags between stages and decides whether to continue.
#[derive(Debug, Default)]
pub struct Reporter {
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter::default()
    }

    /// Scanner-level diagnostic: `[line L] Error: M`
    pub fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Parser/resolver diagnostic anchored at a token:
    /// `[line L] Error at 'lexeme': M` (or `at end` for EOF).
    pub fn error_at(&mut self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            let location = format!(" at '{}'", token.lexeme);
            self.report(token.line, &location, message);
        }
    }

    /// Runtime diagnostic: `M` then `[line L]`.
    pub fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error, error.line());
        self.had_runtime_error = true;
    }

    /// Clears the compile-error flag; called between REPL lines.
    pub fn reset(&mut self) {
        self.had_error = false;
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {}] Error{}: {}", line, location, message);
        self.had_error = true;
    }
}
