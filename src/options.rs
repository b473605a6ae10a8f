//! Configuration options for TOML output.
//!
//! ## Examples
//!
//! ```rust
//! use toml_cursor::{parse, stringify_with_options, StringifyOptions};
//!
//! let doc = parse("[server]\nport = 8080\nhosts = [\"alpha\", \"omega\"]\n").unwrap();
//!
//! // Four-space indentation, one array element per line
//! let options = StringifyOptions::new().with_indent(4).with_array_width(0);
//! let text = stringify_with_options(&doc, options).unwrap();
//! assert!(text.contains("hosts = [\n    \"alpha\",\n    \"omega\"\n]"));
//! ```

/// Controls how [`stringify_with_options`](crate::stringify_with_options)
/// lays out a document.
///
/// # Examples
///
/// ```rust
/// use toml_cursor::StringifyOptions;
///
/// let options = StringifyOptions::new();
/// assert_eq!(options.indent, 2);
/// assert_eq!(options.array_width, 60);
/// assert!(!options.group_digits);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Spaces per nesting level, for nested table blocks and for the
    /// elements of arrays broken over several lines.
    pub indent: usize,
    /// Arrays whose single-line form is longer than this are written one
    /// element per line.
    pub array_width: usize,
    /// Writes integers with `_` between groups of three digits.
    pub group_digits: bool,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        StringifyOptions {
            indent: 2,
            array_width: 60,
            group_digits: false,
        }
    }
}

impl StringifyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// ```rust
    /// use toml_cursor::StringifyOptions;
    ///
    /// let options = StringifyOptions::new().with_indent(4);
    /// assert_eq!(options.indent, 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the width past which arrays are broken over several lines.
    #[must_use]
    pub fn with_array_width(mut self, width: usize) -> Self {
        self.array_width = width;
        self
    }

    /// Enables `1_000_000` style integers.
    ///
    /// ```rust
    /// use toml_cursor::{stringify_with_options, StringifyOptions, Table, Value};
    ///
    /// let mut table = Table::new();
    /// table.insert("population".to_string(), Value::from(8_336_817));
    /// let options = StringifyOptions::new().with_group_digits(true);
    /// let text = stringify_with_options(&table, options).unwrap();
    /// assert_eq!(text, "population = 8_336_817\n");
    /// ```
    #[must_use]
    pub fn with_group_digits(mut self, group: bool) -> Self {
        self.group_digits = group;
        self
    }
}
