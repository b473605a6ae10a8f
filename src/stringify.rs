//! Writing value trees back out as TOML text.
//!
//! Within a table, keys whose values fit on one line are written first as
//! `key = value`. Nested tables and arrays of tables follow as `[path]` and
//! `[[path]]` blocks, in encounter order.
//!
//! ```rust
//! use toml_cursor::{parse, stringify};
//!
//! let doc = parse("title = 'demo'\n[owner]\nname = \"Tom\"\n").unwrap();
//! let text = stringify(&doc).unwrap();
//! assert_eq!(text, "title = \"demo\"\n\n[owner]\nname = \"Tom\"\n");
//! ```

use std::fmt::Write as _;

use tracing::debug;

use crate::error::StringifyError;
use crate::{Array, StringifyOptions, Table, Value, ValueKind};

type Result<T> = std::result::Result<T, StringifyError>;

/// Renders a whole document.
pub(crate) fn document(table: &Table, options: &StringifyOptions) -> Result<String> {
    debug!(keys = table.len(), "stringifying document");
    Writer::new(options, true).table_body("", "", table)
}

/// Renders a value as it would appear after `key = `, without type checks.
pub(crate) fn display_inline(value: &Value) -> Result<String> {
    let options = StringifyOptions::default();
    Writer::new(&options, false).inline(value, false, "")
}

struct Writer<'a> {
    options: &'a StringifyOptions,
    /// Reject arrays that mix element types.
    strict: bool,
}

impl<'a> Writer<'a> {
    fn new(options: &'a StringifyOptions, strict: bool) -> Self {
        Writer { options, strict }
    }

    fn table_body(&self, prefix: &str, indent: &str, table: &Table) -> Result<String> {
        let mut lines = Vec::new();
        for (key, value) in table {
            if value.is_null() || !is_inline(value) {
                continue;
            }
            let path = join_path(prefix, key);
            lines.push(format!(
                "{}{} = {}",
                indent,
                key_text(key),
                self.inline(value, true, &path)?
            ));
        }

        let nested_indent = if !prefix.is_empty() && !lines.is_empty() {
            format!("{}{}", indent, " ".repeat(self.options.indent))
        } else {
            String::new()
        };
        if !lines.is_empty() {
            lines.push(String::new());
        }

        for (key, value) in table {
            match value {
                Value::Null => {}
                Value::Array(array) if !is_inline(value) => {
                    lines.push(self.array_of_tables(prefix, &nested_indent, key, array)?);
                }
                Value::Table(nested) if !is_inline(value) => {
                    lines.push(self.nested_table(prefix, &nested_indent, key, nested)?);
                }
                _ => {}
            }
        }
        Ok(lines.join("\n"))
    }

    fn nested_table(&self, prefix: &str, indent: &str, key: &str, table: &Table) -> Result<String> {
        let full = format!("{}{}", prefix, key_text(key));
        let mut out = String::new();
        if has_inline_keys(table) {
            let _ = writeln!(out, "{}[{}]", indent, full);
        }
        out.push_str(&self.table_body(&format!("{}.", full), indent, table)?);
        Ok(out)
    }

    fn array_of_tables(&self, prefix: &str, indent: &str, key: &str, array: &Array) -> Result<String> {
        let full = format!("{}{}", prefix, key_text(key));
        let mut out = String::new();
        for element in array.iter().filter(|v| !v.is_null()) {
            let Value::Table(table) = element else {
                return Err(StringifyError::MixedArrayTypes {
                    path: full,
                    expected: ValueKind::Table,
                    found: element.kind(),
                });
            };
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}[[{}]]", indent, full);
            out.push_str(&self.table_body(&format!("{}.", full), indent, table)?);
        }
        Ok(out)
    }

    fn inline(&self, value: &Value, multiline_ok: bool, path: &str) -> Result<String> {
        Ok(match value {
            Value::Null => String::new(),
            Value::String(s) if multiline_ok && s.contains('\n') => multiline_string(s),
            Value::String(s) => string(s),
            Value::Integer(i) => self.integer(&i.to_string()),
            Value::BigInt(b) => self.integer(&b.to_string()),
            Value::Float(f) => self.float(*f),
            Value::Boolean(b) => b.to_string(),
            Value::Datetime(dt) => dt.to_string(),
            Value::Array(array) => self.inline_array(array, multiline_ok, path)?,
            Value::Table(table) => self.inline_table(table, path)?,
        })
    }

    fn inline_array(&self, array: &Array, multiline_ok: bool, path: &str) -> Result<String> {
        let items: Vec<&Value> = array.iter().filter(|v| !v.is_null()).collect();
        let Some(first) = items.first() else {
            return Ok("[]".to_string());
        };

        let expected = element_kind(first);
        let mut numbers = (false, false);
        for item in &items {
            let found = element_kind(item);
            match found {
                ValueKind::Integer => numbers.0 = true,
                ValueKind::Float => numbers.1 = true,
                _ => {}
            }
            if self.strict && found != expected && !(is_number(expected) && is_number(found)) {
                return Err(StringifyError::MixedArrayTypes {
                    path: path.to_string(),
                    expected,
                    found,
                });
            }
        }
        let as_floats = numbers.0 && numbers.1;

        let mut rendered = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let text = match item {
                Value::Integer(n) if as_floats => format!("{}.0", n),
                Value::BigInt(n) if as_floats => format!("{}.0", n),
                _ => self.inline(item, multiline_ok, &format!("{}[{}]", path, i))?,
            };
            rendered.push(text);
        }

        let joined = rendered.join(", ");
        if joined.len() > self.options.array_width || joined.contains('\n') {
            let pad = " ".repeat(self.options.indent);
            Ok(format!(
                "[\n{}{}\n]",
                pad,
                rendered.join(&format!(",\n{}", pad))
            ))
        } else {
            Ok(format!("[ {} ]", joined))
        }
    }

    fn inline_table(&self, table: &Table, path: &str) -> Result<String> {
        let mut entries = Vec::with_capacity(table.len());
        for (key, value) in table {
            if value.is_null() {
                continue;
            }
            let text = self.inline(value, false, &join_path(path, key))?;
            entries.push(format!("{} = {}", key_text(key), text));
        }
        if entries.is_empty() {
            Ok("{}".to_string())
        } else {
            Ok(format!("{{ {} }}", entries.join(", ")))
        }
    }

    fn integer(&self, digits: &str) -> String {
        if self.options.group_digits {
            group_digits(digits)
        } else {
            digits.to_string()
        }
    }

    fn float(&self, f: f64) -> String {
        if f.is_nan() {
            return "nan".to_string();
        }
        if f.is_infinite() {
            return if f > 0.0 { "inf" } else { "-inf" }.to_string();
        }
        if f == 0.0 {
            return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
        }
        let magnitude = f.abs();
        if !(1e-5..1e16).contains(&magnitude) {
            return format!("{:e}", f);
        }
        let text = f.to_string();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (text.as_str(), "0"),
        };
        format!("{}.{}", self.integer(int_part), frac_part)
    }
}

/// Whether a value can sit on the right of `key = `. A table left with
/// nothing but nulls is written as `{}`.
fn is_inline(value: &Value) -> bool {
    match value {
        Value::Array(array) => !matches!(array.first(), Some(Value::Table(_))),
        Value::Table(table) => table.values().all(Value::is_null),
        _ => true,
    }
}

fn has_inline_keys(table: &Table) -> bool {
    table.values().any(|v| !v.is_null() && is_inline(v))
}

/// Arrays and tables compare by shape only, whatever their layout.
fn element_kind(value: &Value) -> ValueKind {
    match value {
        Value::Table(_) => ValueKind::Table,
        Value::Array(_) => ValueKind::InlineList,
        other => other.kind(),
    }
}

fn is_number(kind: ValueKind) -> bool {
    matches!(kind, ValueKind::Integer | ValueKind::Float)
}

fn join_path(prefix: &str, key: &str) -> String {
    let prefix = prefix.strip_suffix('.').unwrap_or(prefix);
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn key_text(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        basic_string(key)
    }
}

fn is_control(ch: char) -> bool {
    ch < ' ' || ch == '\u{7f}'
}

fn string(s: &str) -> String {
    if s.contains('"') && !s.contains('\'') && !s.chars().any(is_control) {
        format!("'{}'", s)
    } else {
        basic_string(s)
    }
}

fn basic_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        escape_char(&mut out, ch, true);
    }
    out.push('"');
    out
}

fn escape_char(out: &mut String, ch: char, quote: bool) {
    match ch {
        '\u{8}' => out.push_str("\\b"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\u{c}' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        '\\' => out.push_str("\\\\"),
        '"' if quote => out.push_str("\\\""),
        c if is_control(c) => {
            let _ = write!(out, "\\u{:04X}", c as u32);
        }
        c => out.push(c),
    }
}

/// A `"""` string. Quotes are escaped only where three would meet.
fn multiline_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 8);
    out.push_str("\"\"\"\n");
    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '\n' => out.push('\n'),
            '"' if chars.get(i + 1) == Some(&'"') && chars.get(i + 2) == Some(&'"') => {
                out.push_str("\\\"");
            }
            _ => escape_char(&mut out, ch, false),
        }
    }
    if out.ends_with('"') {
        // a line continuation keeps the closing delimiter apart
        out.push_str("\\\n");
    }
    out.push_str("\"\"\"");
    out
}

/// Inserts `_` between groups of three digits.
fn group_digits(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, Datetime};
    use pretty_assertions::assert_eq;

    fn table(entries: Vec<(&str, Value)>) -> Table {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn write(table: &Table) -> String {
        document(table, &StringifyOptions::default()).unwrap()
    }

    #[test]
    fn test_inline_keys_before_blocks() {
        let doc = table(vec![
            ("owner", Value::Table(table(vec![("name", Value::from("Tom"))]))),
            ("title", Value::from("demo")),
        ]);
        assert_eq!(write(&doc), "title = \"demo\"\n\n[owner]\nname = \"Tom\"\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(write(&Table::new()), "");
    }

    #[test]
    fn test_null_entries_skipped() {
        let doc = table(vec![("a", Value::Null), ("b", Value::from(1))]);
        assert_eq!(write(&doc), "b = 1\n");
    }

    #[test]
    fn test_table_of_nulls_kept_as_empty() {
        let doc = table(vec![
            ("a", Value::from(1)),
            ("gone", Value::Table(table(vec![("x", Value::Null)]))),
            (
                "outer",
                Value::Table(table(vec![(
                    "inner",
                    Value::Table(table(vec![("y", Value::Null)])),
                )])),
            ),
        ]);
        let text = write(&doc);
        assert_eq!(text, "a = 1
gone = {}

[outer]
inner = {}
");
        let parsed = parse(&text).unwrap();
        assert!(parsed["gone"].as_table().unwrap().is_empty());
        assert!(parsed["outer"]["inner"].as_table().unwrap().is_empty());
    }

    #[test]
    fn test_intermediate_header_omitted() {
        let doc = table(vec![(
            "a",
            Value::Table(table(vec![(
                "b",
                Value::Table(table(vec![("c", Value::from(1))])),
            )])),
        )]);
        assert_eq!(write(&doc), "[a.b]\nc = 1\n");
    }

    #[test]
    fn test_nested_blocks_are_indented() {
        let doc = table(vec![(
            "a",
            Value::Table(table(vec![
                ("x", Value::from(1)),
                ("b", Value::Table(table(vec![("y", Value::from(2))]))),
            ])),
        )]);
        assert_eq!(write(&doc), "[a]\nx = 1\n\n  [a.b]\n  y = 2\n");
    }

    #[test]
    fn test_array_of_tables() {
        let mut fruits = Array::of_tables();
        fruits.push(Value::Table(table(vec![("name", Value::from("apple"))])));
        fruits.push(Value::Table(table(vec![("name", Value::from("banana"))])));
        let doc = table(vec![("fruit", Value::Array(fruits))]);
        assert_eq!(
            write(&doc),
            "[[fruit]]\nname = \"apple\"\n\n[[fruit]]\nname = \"banana\"\n"
        );
    }

    #[test]
    fn test_array_of_tables_rejects_scalars() {
        let doc = table(vec![(
            "a",
            Value::from(vec![Value::Table(Table::new()), Value::from(1)]),
        )]);
        assert_eq!(
            document(&doc, &StringifyOptions::default()).unwrap_err(),
            StringifyError::MixedArrayTypes {
                path: "a".to_string(),
                expected: ValueKind::Table,
                found: ValueKind::Integer,
            }
        );
    }

    #[test]
    fn test_keys_quoted_when_needed() {
        let doc = table(vec![
            ("bare-key_1", Value::from(1)),
            ("has space", Value::from(2)),
            ("", Value::from(3)),
            ("dot.ted", Value::from(4)),
        ]);
        assert_eq!(
            write(&doc),
            "bare-key_1 = 1\n\"has space\" = 2\n\"\" = 3\n\"dot.ted\" = 4\n"
        );
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(string("plain"), "\"plain\"");
        assert_eq!(string("say \"hi\""), "'say \"hi\"'");
        assert_eq!(string("it's \"x\""), "\"it's \\\"x\\\"\"");
        assert_eq!(string("tab\t\"q\""), "\"tab\\t\\\"q\\\"\"");
        assert_eq!(string("bell\u{7}"), "\"bell\\u0007\"");
        assert_eq!(string("del\u{7f}"), "\"del\\u007F\"");
        assert_eq!(string("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn test_multiline_string_at_top_level() {
        let doc = table(vec![("poem", Value::from("roses\nviolets"))]);
        assert_eq!(write(&doc), "poem = \"\"\"\nroses\nviolets\"\"\"\n");
    }

    #[test]
    fn test_multiline_string_quotes() {
        assert_eq!(multiline_string("a\n\"\"\"b"), "\"\"\"\na\n\\\"\"\"b\"\"\"");
        assert_eq!(multiline_string("end\n\""), "\"\"\"\nend\n\"\\\n\"\"\"");
    }

    #[test]
    fn test_newline_escaped_inside_arrays() {
        let doc = table(vec![("a", Value::from(vec![Value::from("x\ny")]))]);
        assert_eq!(write(&doc), "a = [ \"x\\ny\" ]\n");
    }

    #[test]
    fn test_special_floats() {
        let options = StringifyOptions::default();
        let w = Writer::new(&options, true);
        assert_eq!(w.float(f64::INFINITY), "inf");
        assert_eq!(w.float(f64::NEG_INFINITY), "-inf");
        assert_eq!(w.float(f64::NAN), "nan");
        assert_eq!(w.float(-0.0), "-0.0");
        assert_eq!(w.float(0.0), "0.0");
        assert_eq!(w.float(3.0), "3.0");
        assert_eq!(w.float(-2.5), "-2.5");
        assert_eq!(w.float(1e300), "1e300");
        assert_eq!(w.float(6.626e-34), "6.626e-34");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("1234567"), "1_234_567");
        assert_eq!(group_digits("-1000"), "-1_000");
        assert_eq!(group_digits("999"), "999");
        let options = StringifyOptions::new().with_group_digits(true);
        assert_eq!(Writer::new(&options, true).float(1234.5), "1_234.5");
    }

    #[test]
    fn test_mixed_numbers_written_as_floats() {
        let doc = table(vec![(
            "n",
            Value::from(vec![Value::from(1), Value::from(2.5)]),
        )]);
        assert_eq!(write(&doc), "n = [ 1.0, 2.5 ]\n");
    }

    #[test]
    fn test_mixed_array_rejected() {
        let doc = table(vec![(
            "a",
            Value::Table(table(vec![
                ("k", Value::from(1)),
                ("arr", Value::from(vec![Value::from(1), Value::from("x")])),
            ])),
        )]);
        let err = document(&doc, &StringifyOptions::default()).unwrap_err();
        assert_eq!(
            err,
            StringifyError::MixedArrayTypes {
                path: "a.arr".to_string(),
                expected: ValueKind::Integer,
                found: ValueKind::String,
            }
        );
    }

    #[test]
    fn test_long_arrays_wrap() {
        let words: Vec<Value> = (0..8).map(|i| Value::from(format!("word-{}", i))).collect();
        let doc = table(vec![("w", Value::from(words))]);
        let text = write(&doc);
        assert!(text.starts_with("w = [\n  \"word-0\",\n  \"word-1\","));
        assert!(text.ends_with("\"word-7\"\n]\n"));
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_inline_tables_in_arrays() {
        let inner = Value::from(vec![Value::Table(table(vec![("x", Value::from(1))]))]);
        let doc = table(vec![("grid", Value::from(vec![inner]))]);
        assert_eq!(write(&doc), "grid = [ [ { x = 1 } ] ]\n");
    }

    #[test]
    fn test_empty_containers() {
        let doc = table(vec![
            ("arr", Value::Array(Array::new())),
            ("tab", Value::Table(Table::new())),
        ]);
        assert_eq!(write(&doc), "arr = []\ntab = {}\n");
    }

    #[test]
    fn test_datetimes_and_bigints() {
        let dt: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
        let big = Value::BigInt("123456789012345678901234567890".parse().unwrap());
        let doc = table(vec![("when", Value::Datetime(dt)), ("big", big)]);
        assert_eq!(
            write(&doc),
            "when = 1979-05-27T07:32:00Z\nbig = 123456789012345678901234567890\n"
        );
    }

    #[test]
    fn test_display_inline_is_lenient() {
        let value = Value::from(vec![Value::from(1), Value::from("x")]);
        assert_eq!(display_inline(&value).unwrap(), "[ 1, \"x\" ]");
        assert_eq!(value.to_string(), "[ 1, \"x\" ]");
        assert_eq!(Value::Null.to_string(), "");
    }
}
