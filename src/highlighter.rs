// ABOUTME: Syntax highlighter for REPL with color support
// Implements rustyline's Highlighter trait to provide ANSI color codes
// for language syntax elements while preserving display width

use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;
use std::borrow::Cow;
use std::collections::HashSet;

// ANSI color codes (using 3-bit/4-bit colors for maximum terminal compatibility)
const COLOR_RESET: &str = "\x1b[0m";
const COLOR_BRACKETS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_KEYWORD: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_NATIVE: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_LITERAL: &str = "\x1b[33m"; // Yellow
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)

/// Main highlighter helper for the REPL
pub struct SkinkHelper;

impl SkinkHelper {
    pub fn new() -> Self {
        SkinkHelper
    }
}

impl Default for SkinkHelper {
    fn default() -> Self {
        Self::new()
    }
}

// Implement the required rustyline traits
impl Helper for SkinkHelper {}

impl Completer for SkinkHelper {
    type Candidate = String;
}

impl Hinter for SkinkHelper {
    type Hint = String;
}

impl Validator for SkinkHelper {}

impl Highlighter for SkinkHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let keywords = get_keywords();
        let literals = get_literal_words();
        let natives = get_natives();

        let highlighted = highlight_line(line, &keywords, &literals, &natives);

        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true // Always trigger re-highlighting on character input or cursor movement
    }
}

/// Tokenize a line and apply syntax highlighting
fn highlight_line(
    line: &str,
    keywords: &HashSet<&'static str>,
    literals: &HashSet<&'static str>,
    natives: &HashSet<&'static str>,
) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // Comments: // to end of line
            '/' if i + 1 < chars.len() && chars[i + 1] == '/' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() && chars[i] != '\n' {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            // Strings: preserve exact content but colorize
            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;
                while i < chars.len() {
                    if chars[i] == '"' {
                        result.push('"');
                        i += 1;
                        break;
                    }
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            // Numbers, with an optional fractional part
            '0'..='9' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let number: String = chars[start..i].iter().collect();
                result.push_str(COLOR_NUMBER);
                result.push_str(&number);
                result.push_str(COLOR_RESET);
            }

            // Brackets and braces
            '(' | ')' | '[' | ']' | '{' | '}' => {
                result.push_str(COLOR_BRACKETS);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            // Identifiers and keywords
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();

                if literals.contains(word.as_str()) {
                    result.push_str(COLOR_LITERAL);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else if keywords.contains(word.as_str()) {
                    result.push_str(COLOR_KEYWORD);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else if natives.contains(word.as_str()) {
                    result.push_str(COLOR_NATIVE);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else {
                    result.push_str(&word);
                }
            }

            // Everything else passes through unchanged
            _ => {
                result.push(chars[i]);
                i += 1;
            }
        }
    }

    result
}

/// Keywords with special evaluation or statement semantics
fn get_keywords() -> HashSet<&'static str> {
    [
        "and", "break", "class", "continue", "else", "for", "fun", "if", "lambda", "or", "print",
        "return", "super", "this", "var", "while",
    ]
    .iter()
    .copied()
    .collect()
}

/// Literal words
fn get_literal_words() -> HashSet<&'static str> {
    ["true", "false", "nil"].iter().copied().collect()
}

/// Native functions pre-populated in globals
fn get_natives() -> HashSet<&'static str> {
    ["clock", "str", "len", "map", "filter", "reduce"]
        .iter()
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight(line: &str) -> String {
        highlight_line(line, &get_keywords(), &get_literal_words(), &get_natives())
    }

    #[test]
    fn test_number_highlighting() {
        assert!(highlight("42").contains(COLOR_NUMBER));
        assert!(highlight("3.5").contains(COLOR_NUMBER));
    }

    #[test]
    fn test_string_highlighting() {
        assert!(highlight("\"hello\"").contains(COLOR_STRING));
    }

    #[test]
    fn test_comment_highlighting() {
        assert!(highlight("// a comment").contains(COLOR_COMMENT));
    }

    #[test]
    fn test_keyword_highlighting() {
        let highlighted = highlight("var x = 5;");
        assert!(highlighted.contains(COLOR_KEYWORD));
        assert!(highlighted.contains(COLOR_NUMBER));
    }

    #[test]
    fn test_native_highlighting() {
        let highlighted = highlight("len(xs)");
        assert!(highlighted.contains(COLOR_NATIVE));
        assert!(highlighted.contains(COLOR_BRACKETS));
    }

    #[test]
    fn test_literal_highlighting() {
        assert!(highlight("true").contains(COLOR_LITERAL));
        assert!(highlight("nil").contains(COLOR_LITERAL));
    }

    #[test]
    fn test_plain_identifier_is_unstyled() {
        assert_eq!(highlight("plain_name"), "plain_name");
    }

    #[test]
    fn test_slash_alone_is_not_a_comment() {
        assert_eq!(highlight("a / b"), "a / b");
    }
}
