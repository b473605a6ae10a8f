//! Insertion-ordered TOML tables.
//!
//! A [`Table`] is a thin wrapper around [`IndexMap`] that also remembers how
//! the table came into existence ([`TableKind`]). The parser needs that to
//! enforce TOML's redefinition rules: a table created on the way to a
//! `[a.b.c]` header may be declared later, one created by a dotted key or a
//! `{ ... }` literal may not.
//!
//! ## Examples
//!
//! ```rust
//! use toml_cursor::{Table, Value};
//!
//! let mut table = Table::new();
//! table.insert("name".to_string(), Value::from("Alice"));
//! table.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Value;

/// How a table entered the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TableKind {
    /// The document root, a table built through the API, or an intermediate
    /// step of a header path. May still be declared by a header.
    #[default]
    Implicit,
    /// Created by a dotted-key assignment such as `a.b = 1`.
    Dotted,
    /// The target of a `[header]`, or an element of an array of tables.
    Declared,
    /// A `{ ... }` literal.
    Inline,
}

/// An ordered map of string keys to TOML values.
///
/// Equality compares entries only; neither the [`TableKind`] nor the
/// insertion order takes part.
///
/// # Examples
///
/// ```rust
/// use toml_cursor::{Table, Value};
///
/// let mut table = Table::new();
/// table.insert("first".to_string(), Value::from(1));
/// table.insert("second".to_string(), Value::from(2));
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = table.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Table {
    entries: IndexMap<String, Value>,
    kind: TableKind,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Table::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Table {
            entries: IndexMap::with_capacity(capacity),
            kind: TableKind::Implicit,
        }
    }

    /// Creates an empty table of the given kind.
    #[must_use]
    pub fn with_kind(kind: TableKind) -> Self {
        Table {
            entries: IndexMap::new(),
            kind,
        }
    }

    /// Creates an empty inline table.
    ///
    /// ```rust
    /// use toml_cursor::{Table, TableKind};
    ///
    /// assert_eq!(Table::inline().kind(), TableKind::Inline);
    /// ```
    #[must_use]
    pub fn inline() -> Self {
        Table::with_kind(TableKind::Inline)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: TableKind) {
        self.kind = kind;
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// This does not apply TOML's redefinition rules; those belong to the
    /// parser.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.entries.values()
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl From<IndexMap<String, Value>> for Table {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Table {
            entries,
            kind: TableKind::Implicit,
        }
    }
}

impl From<HashMap<String, Value>> for Table {
    fn from(map: HashMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Table> for HashMap<String, Value> {
    fn from(table: Table) -> Self {
        table.entries.into_iter().collect()
    }
}

impl IntoIterator for Table {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Table::from(IndexMap::from_iter(iter))
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = Table;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a TOML table")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Table, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = Table::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    table.insert(key, value);
                }
                Ok(table)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Table, E> {
                Ok(Table::new())
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
