// ABOUTME: Error types for runtime failures in the interpreter

use crate::value::Value;
use thiserror::Error;

/// A runtime failure, carrying the source line for diagnostics.
///
/// These unwind the evaluator to the top-level `interpret` entry, where the
/// host reports them once and discards them.
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    /// Operand or argument had the wrong runtime type
    #[error("{message}")]
    TypeMismatch { message: String, line: usize },

    #[error("Expected {expected} arguments but got {actual}.")]
    Arity {
        expected: usize,
        actual: usize,
        line: usize,
    },

    #[error("Can only call functions.")]
    NotCallable { line: usize },

    #[error("Array index must be a whole number.")]
    BadIndex { line: usize },

    #[error("Array index out of bounds.")]
    IndexOutOfBounds { line: usize },

    #[error("Dictionary does not contain given key.")]
    MissingKey { line: usize },

    #[error("Dictionary key must be nil, a boolean, a number, or a string.")]
    InvalidKey { line: usize },
}

impl RuntimeError {
    /// Create a type mismatch error from an expectation and the offending value
    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        RuntimeError::TypeMismatch {
            message: message.into(),
            line,
        }
    }

    /// Type mismatch for a native function argument
    pub fn native_type_error(function: &str, expected: &str, actual: &Value, line: usize) -> Self {
        RuntimeError::TypeMismatch {
            message: format!(
                "{}: expected {}, got {}.",
                function,
                expected,
                actual.type_name()
            ),
            line,
        }
    }

    /// The source line this error should be reported at
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::TypeMismatch { line, .. }
            | RuntimeError::Arity { line, .. }
            | RuntimeError::NotCallable { line }
            | RuntimeError::BadIndex { line }
            | RuntimeError::IndexOutOfBounds { line }
            | RuntimeError::MissingKey { line }
            | RuntimeError::InvalidKey { line } => *line,
        }
    }
}
