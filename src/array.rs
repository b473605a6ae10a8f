//! TOML arrays: `[ ... ]` literals and `[[header]]` arrays of tables.

use std::fmt;
use std::ops::Index;
use std::slice;

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Value;

/// How an array entered the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ArrayKind {
    /// A `[ ... ]` literal, or an array built through the API.
    #[default]
    Inline,
    /// Built by repeated `[[header]]` lines; only ever holds tables.
    OfTables,
}

/// An ordered list of values.
///
/// Equality compares items only.
///
/// ```rust
/// use toml_cursor::{Array, Value};
///
/// let array: Array = vec![Value::from(1), Value::from(2)].into();
/// assert_eq!(array.len(), 2);
/// assert_eq!(array[0].as_integer(), Some(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Array {
    items: Vec<Value>,
    kind: ArrayKind,
}

impl Array {
    #[must_use]
    pub fn new() -> Self {
        Array::default()
    }

    /// Creates an empty array of tables.
    #[must_use]
    pub fn of_tables() -> Self {
        Array {
            items: Vec::new(),
            kind: ArrayKind::OfTables,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.items.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Index<usize> for Array {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array {
            items,
            kind: ArrayKind::Inline,
        }
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Array::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for Array {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Array {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArrayVisitor;

        impl<'de> Visitor<'de> for ArrayVisitor {
            type Value = Array;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a TOML array")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Array, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    items.push(elem);
                }
                Ok(Array::from(items))
            }
        }

        deserializer.deserialize_seq(ArrayVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_kind() {
        let mut tables = Array::of_tables();
        tables.push(Value::Table(crate::Table::new()));
        let inline: Array = vec![Value::Table(crate::Table::new())].into();
        assert_eq!(tables, inline);
        assert_ne!(tables.kind(), inline.kind());
    }

    #[test]
    fn test_collect_and_iterate() {
        let array: Array = (1..=3).map(Value::from).collect();
        let sum: i64 = array.iter().filter_map(Value::as_integer).sum();
        assert_eq!(sum, 6);
        assert_eq!(array.kind(), ArrayKind::Inline);
    }
}
