//! # toml_cursor
//!
//! An incremental TOML parser and stringifier.
//!
//! The parser consumes its input one character at a time through a cursor
//! that keeps its own explicit stack of continuation frames, so a document
//! can be fed in arbitrary chunks (straight off a socket or a pipe) and the
//! parse suspends between chunks without holding on to any native stack.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! toml_cursor = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Parsing and Stringifying
//!
//! ```rust
//! use toml_cursor::{parse, stringify, Value};
//!
//! let doc = parse("title = \"TOML\"\n[owner]\nname = \"Tom\"\n").unwrap();
//! assert_eq!(doc["owner"]["name"], Value::from("Tom"));
//!
//! let text = stringify(&doc).unwrap();
//! assert_eq!(parse(&text).unwrap(), doc);
//! ```
//!
//! ### Feeding Chunks
//!
//! ```rust
//! use toml_cursor::parse_incremental;
//!
//! let mut parser = parse_incremental();
//! for chunk in ["ports = [ 80", "80, 8081 ]\nenabled = t", "rue\n"] {
//!     parser.feed(chunk).unwrap();
//! }
//! let doc = parser.finish().unwrap();
//! assert_eq!(doc["ports"][0].as_integer(), Some(8080));
//! assert_eq!(doc["enabled"].as_bool(), Some(true));
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use toml_cursor::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     name: String,
//!     retries: u32,
//!     servers: Vec<Server>,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     host: String,
//! }
//!
//! let config = Config {
//!     name: "edge".to_string(),
//!     retries: 3,
//!     servers: vec![Server { host: "alpha".to_string() }],
//! };
//!
//! let text = to_string(&config).unwrap();
//! assert_eq!(text, "name = \"edge\"\nretries = 3\n\n[[servers]]\nhost = \"alpha\"\n");
//!
//! let back: Config = from_str(&text).unwrap();
//! assert_eq!(back, config);
//! ```
//!
//! ### Errors
//!
//! Parse errors carry the line, column and character offset of the
//! offending character:
//!
//! ```rust
//! use toml_cursor::{parse, ErrorKind};
//!
//! let err = parse("a = 1\nb = @\n").unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::UnexpectedCharacter { found: Some('@'), .. }));
//! assert_eq!((err.line, err.col, err.pos), (2, 5, 10));
//!
//! let err = parse("a = 1\na = 2\n").unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::KeyRedefinition { .. }));
//! assert_eq!(err.line, 2);
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`debug` for parse and stringify
//! boundaries and aborted parses, `trace` for table navigation). Install a
//! subscriber to see them; none is installed by the library.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - parse, inspect and write a document
//! - **`incremental.rs`** - feeding a document in chunks
//! - **`dynamic_values.rs`** - working with [`Value`] directly
//! - **`custom_options.rs`** - indentation, array wrapping, digit grouping
//!
//! Run any example with: `cargo run --example <name>`

pub mod array;
pub mod cursor;
pub mod datetime;
pub mod de;
pub mod error;
pub mod macros;
pub mod options;
pub mod parser;
pub mod ser;
mod stringify;
pub mod table;
pub mod value;

pub use array::{Array, ArrayKind};
pub use datetime::Datetime;
pub use de::{from_value, ValueDeserializer};
pub use error::{Error, ErrorKind, ParseError, Result, StringifyError};
pub use options::StringifyOptions;
pub use parser::Parser;
pub use ser::{to_value, ValueSerializer};
pub use table::{Table, TableKind};
pub use value::{Value, ValueKind};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Parses a complete TOML document.
///
/// # Examples
///
/// ```rust
/// use toml_cursor::parse;
///
/// let doc = parse("[a.b]\nc = 1\n").unwrap();
/// assert_eq!(doc["a"]["b"]["c"].as_integer(), Some(1));
/// ```
///
/// # Errors
///
/// Returns the first grammar violation, positioned at the character that
/// caused it.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> std::result::Result<Table, ParseError> {
    debug!(bytes = text.len(), "parse started");
    let mut parser = Parser::new();
    parser.feed(text)?;
    parser.finish()
}

/// Returns a [`Parser`] to be fed chunk by chunk.
#[must_use]
pub fn parse_incremental() -> Parser {
    Parser::new()
}

/// Writes a document with the default [`StringifyOptions`].
///
/// # Examples
///
/// ```rust
/// use toml_cursor::{stringify, Table, Value};
///
/// let mut table = Table::new();
/// table.insert("answer".to_string(), Value::from(42));
/// assert_eq!(stringify(&table).unwrap(), "answer = 42\n");
/// ```
///
/// # Errors
///
/// Returns an error if an array mixes element types or an array of tables
/// holds something other than a table.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stringify(table: &Table) -> std::result::Result<String, StringifyError> {
    stringify::document(table, &StringifyOptions::default())
}

/// Writes a document with custom layout options.
///
/// # Errors
///
/// See [`stringify`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stringify_with_options(
    table: &Table,
    options: StringifyOptions,
) -> std::result::Result<String, StringifyError> {
    stringify::document(table, &options)
}

/// Writes a value as a document. Only tables can be documents.
///
/// ```rust
/// use toml_cursor::{stringify_value, StringifyError, Value};
///
/// let err = stringify_value(&Value::from(1)).unwrap_err();
/// assert!(matches!(err, StringifyError::NotATable { .. }));
/// ```
///
/// # Errors
///
/// Returns [`StringifyError::NotATable`] for anything but a table, and
/// otherwise the errors of [`stringify`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stringify_value(value: &Value) -> std::result::Result<String, StringifyError> {
    match value {
        Value::Table(table) => stringify(table),
        other => Err(StringifyError::NotATable {
            path: String::new(),
            found: other.kind(),
        }),
    }
}

/// Deserializes an instance of `T` from TOML text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use toml_cursor::from_str;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed input, or a deserialization error
/// when the document does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let table = parse(text)?;
    from_value(Value::Table(table))
}

/// Serializes `T` as a TOML document.
///
/// `T` must serialize as a map or struct; `None` fields are left out.
///
/// # Errors
///
/// Returns an error if `T` does not serialize to a table, uses an
/// unsupported type, or produces arrays that cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    Ok(stringify_value(&value)?)
}
