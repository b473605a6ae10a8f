//! Error types for TOML parsing and stringification.
//!
//! Three layers of errors live here:
//!
//! - [`ErrorKind`]: what went wrong while the grammar was consuming input
//! - [`ParseError`]: an [`ErrorKind`] enriched with the line, column and
//!   character offset where the parser stopped
//! - [`StringifyError`]: a value tree that cannot be written as TOML, with
//!   the dotted path of the offending value
//!
//! [`Error`] wraps all of them for the serde entry points.
//!
//! ## Examples
//!
//! ```rust
//! use toml_cursor::{parse, ErrorKind};
//!
//! let source = "a = 1\na = 2\n";
//! let err = parse(source).unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::KeyRedefinition { .. }));
//! assert_eq!(err.line, 2);
//!
//! // Render a pointer into the offending line
//! let report = err.render(source);
//! assert!(report.contains("2> a = 2"));
//! ```

use std::fmt::{self, Write as _};
use thiserror::Error;

use crate::value::ValueKind;

/// The reason a parse was aborted.
///
/// Every grammar state enumerates the characters it accepts; anything else
/// ends up as one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A character no transition of the current state accepts.
    #[error("unexpected {}, expected {expected}", describe(.found))]
    UnexpectedCharacter {
        found: Option<char>,
        expected: &'static str,
    },

    /// An assignment or header collides with an existing or declared key.
    #[error("cannot redefine existing key `{key}`")]
    KeyRedefinition { key: String },

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated inline array")]
    UnterminatedArray,

    #[error("unterminated inline table")]
    UnterminatedInlineTable,

    #[error("invalid escape sequence `\\{}`", describe_raw(.0))]
    InvalidEscapeSequence(Option<char>),

    #[error("invalid unicode escape: {0}")]
    InvalidUnicodeEscape(String),

    #[error("invalid number: {0}")]
    InvalidNumberLiteral(&'static str),

    #[error("invalid datetime: {0}")]
    InvalidDateTime(String),

    /// A raw control character inside a string literal.
    #[error("control characters are not allowed in strings, use \\u{0:04X} instead")]
    ControlCharacterInString(u32),

    /// An inline array whose elements do not share one type.
    #[error("arrays must be a single type, not a mix of {expected} and {found}")]
    MixedArrayTypes { expected: ValueKind, found: ValueKind },

    #[error("unexpected end of input")]
    PrematureEndOfInput,
}

impl ErrorKind {
    /// Shorthand for [`ErrorKind::UnexpectedCharacter`].
    pub fn unexpected(found: Option<char>, expected: &'static str) -> Self {
        ErrorKind::UnexpectedCharacter { found, expected }
    }

    /// Shorthand for [`ErrorKind::KeyRedefinition`].
    pub fn redefinition(key: impl Into<String>) -> Self {
        ErrorKind::KeyRedefinition { key: key.into() }
    }
}

fn describe(found: &Option<char>) -> String {
    match found {
        None => "end of input".to_string(),
        Some(ch) if ch.is_control() => format!("character U+{:04X}", *ch as u32),
        Some(ch) => format!("character '{}'", ch),
    }
}

fn describe_raw(found: &Option<char>) -> String {
    match found {
        None => String::new(),
        Some(ch) => ch.escape_default().to_string(),
    }
}

/// A parse failure with its position in the source.
///
/// `line` and `col` are 1-based and refer to the character the parser was
/// looking at; `pos` is the 0-based offset of that character counted in
/// code points. At end of input `pos` equals the number of characters read.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at line {line}, column {col}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub line: usize,
    pub col: usize,
    pub pos: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, line: usize, col: usize, pos: usize) -> Self {
        ParseError {
            kind,
            line,
            col,
            pos,
        }
    }

    /// Renders the error with an excerpt of `source` around the failing line.
    ///
    /// The failing line is marked with `>` and followed by a caret under the
    /// offending column; up to one line of context is shown on each side.
    ///
    /// ```rust
    /// use toml_cursor::parse;
    ///
    /// let source = "x = 1\ny = @\nz = 3";
    /// let err = parse(source).unwrap_err();
    /// let report = err.render(source);
    ///
    /// assert!(report.contains("1: x = 1"));
    /// assert!(report.contains("2> y = @"));
    /// assert!(report.contains("3: z = 3"));
    /// assert!(report.contains("\n       ^\n"));
    /// ```
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let mut out = format!(
            "{} at line {}, column {}, offset {}:\n",
            self.kind, self.line, self.col, self.pos
        );

        let lines: Vec<&str> = source.split('\n').collect();
        let failing = self.line.saturating_sub(1);
        let first = failing.saturating_sub(1);
        let last = (failing + 2).min(lines.len());
        let width = last.to_string().len();

        for (index, line) in lines.iter().enumerate().take(last).skip(first) {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if index == failing {
                let _ = writeln!(out, "{:>width$}> {}", index + 1, line, width = width);
                let _ = writeln!(
                    out,
                    "{:pad$}^",
                    "",
                    pad = width + 2 + self.col.saturating_sub(1)
                );
            } else {
                let _ = writeln!(out, "{:>width$}: {}", index + 1, line, width = width);
            }
        }
        out
    }
}

/// A value tree that cannot be written as TOML.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StringifyError {
    /// An array mixes element types other than integers with floats.
    #[error("array at `{}` must be a single type, not a mix of {expected} and {found}", display_path(.path))]
    MixedArrayTypes {
        path: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A document root, or an array-of-tables element, is not a table.
    #[error("expected a table at `{}`, found {found}", display_path(.path))]
    NotATable { path: String, found: ValueKind },
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Errors returned by the serde entry points.
///
/// # Examples
///
/// ```rust
/// use toml_cursor::{from_str, Error, Value};
///
/// let result: Result<Value, Error> = from_str("key = [1, 'two']");
/// assert!(matches!(result, Err(Error::Parse(_))));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Stringify(#[from] StringifyError),

    /// A Rust type with no TOML counterpart, or a document root that is not a table.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A value of the wrong shape was found while deserializing.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_cursor::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
