// ABOUTME: Configuration and constants for the interpreter
// This module contains version info, welcome messages, and process exit codes

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Skink v1.0";
pub const WELCOME_SUBTITLE: &str = "A small dynamic scripting language in Rust";

pub const PROMPT: &str = "> ";
pub const HISTORY_FILE: &str = ".skink_history";

// ============================================================================
// Process exit codes (sysexits.h)
// ============================================================================

/// Command line usage error
pub const EX_USAGE: i32 = 64;
/// Input could not be compiled (scan, parse, or resolve error)
pub const EX_DATAERR: i32 = 65;
/// A runtime error unwound the program
pub const EX_SOFTWARE: i32 = 70;
/// Script file could not be read
pub const EX_IOERR: i32 = 74;
