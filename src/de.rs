//! Serde deserialization out of [`Value`].
//!
//! [`from_str`](crate::from_str) parses text into a [`Table`] first and then
//! walks it with [`ValueDeserializer`], so every type that can be read from a
//! document can equally be read from a [`Value`] built by hand.
//!
//! ```rust
//! use serde::Deserialize;
//! use toml_cursor::{from_value, toml};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = toml!({ "x": 1, "y": 2 });
//! let point: Point = from_value(value).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```

use num_bigint::BigInt;
use serde::de::{self, Deserializer as _, IntoDeserializer};
use serde::forward_to_deserialize_any;

use crate::datetime::DATETIME_NEWTYPE;
use crate::{Array, Error, Result, Table, Value};

/// Deserializes a Rust value out of a [`Value`].
///
/// # Errors
///
/// Returns an error when the value's shape does not match `T`.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: de::DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

/// A serde [`Deserializer`](serde::Deserializer) reading from an owned
/// [`Value`].
#[derive(Debug)]
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

fn visit_bigint<'de, V>(b: BigInt, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    match i128::try_from(&b) {
        Ok(i) => visitor.visit_i128(i),
        Err(_) => visitor.visit_string(b.to_string()),
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::String(s) => visitor.visit_string(s),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::BigInt(b) => visit_bigint(b, visitor),
            Value::Float(f) => visitor.visit_f64(f),
            Value::Boolean(b) => visitor.visit_bool(b),
            Value::Datetime(dt) => visitor.visit_map(DatetimeAccess {
                text: Some(dt.to_string()),
            }),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Table(table) => visitor.visit_map(MapDeserializer::new(table)),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Datetime(dt) => visitor.visit_string(dt.to_string()),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(ValueDeserializer::new(other)),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Table(table) => {
                let mut entries = table.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    _ => Err(Error::custom(
                        "expected a table with exactly one key for an enum variant",
                    )),
                }
            }
            other => Err(Error::type_mismatch("enum", other.kind().as_str())),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(array: Array) -> Self {
        SeqDeserializer {
            iter: array.into_vec().into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: <Table as IntoIterator>::IntoIter,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(table: Table) -> Self {
        MapDeserializer {
            iter: table.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Presents a datetime as `{ DATETIME_NEWTYPE = "<text>" }` so that
/// [`Value`] and [`Datetime`](crate::Datetime) can tell it from a string.
struct DatetimeAccess {
    text: Option<String>,
}

impl<'de> de::MapAccess<'de> for DatetimeAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.text.is_none() {
            return Ok(None);
        }
        seed.deserialize(DATETIME_NEWTYPE.into_deserializer())
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.text.take() {
            Some(text) => seed.deserialize(text.into_deserializer()),
            None => Err(Error::custom("datetime value already consumed")),
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Null => Ok(()),
            Value::Table(t) if t.is_empty() => Ok(()),
            other => Err(Error::type_mismatch("unit variant", other.kind().as_str())),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            other => Err(Error::type_mismatch("tuple variant", other.kind().as_str())),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Table(table) => visitor.visit_map(MapDeserializer::new(table)),
            other => Err(Error::type_mismatch("struct variant", other.kind().as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, Datetime};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Config {
        title: String,
        port: u16,
        ratio: f32,
        tags: Vec<String>,
        owner: Option<Owner>,
        released: Datetime,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Owner {
        name: String,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Point,
        Circle(f64),
        Pair(i32, i32),
        Rect { w: u8, h: u8 },
    }

    fn table(text: &str) -> Value {
        Value::Table(parse(text).unwrap())
    }

    #[test]
    fn test_struct_from_document() {
        let value = table(
            "title = 'demo'\nport = 8080\nratio = 1\ntags = ['a', 'b']\n\
             released = 1979-05-27\n[owner]\nname = 'Tom'\n",
        );
        let config: Config = from_value(value).unwrap();
        assert_eq!(
            config,
            Config {
                title: "demo".into(),
                port: 8080,
                ratio: 1.0,
                tags: vec!["a".into(), "b".into()],
                owner: Some(Owner { name: "Tom".into() }),
                released: "1979-05-27".parse().unwrap(),
            }
        );
    }

    #[test]
    fn test_missing_option_is_none() {
        #[derive(Deserialize)]
        struct Partial {
            owner: Option<Owner>,
        }
        let partial: Partial = from_value(table("")).unwrap();
        assert!(partial.owner.is_none());
    }

    #[test]
    fn test_out_of_range_integer_rejected() {
        #[derive(Deserialize, Debug)]
        struct Small {
            #[allow(dead_code)]
            port: u8,
        }
        assert!(from_value::<Small>(table("port = 300")).is_err());
    }

    #[test]
    fn test_enum_representations() {
        let shapes: HashMap<String, Shape> = from_value(table(
            "a = 'Point'\nb = { Circle = 2.5 }\nc = { Pair = [1, 2] }\n\
             d = { Rect = { w = 3, h = 4 } }\n",
        ))
        .unwrap();
        assert_eq!(shapes["a"], Shape::Point);
        assert_eq!(shapes["b"], Shape::Circle(2.5));
        assert_eq!(shapes["c"], Shape::Pair(1, 2));
        assert_eq!(shapes["d"], Shape::Rect { w: 3, h: 4 });

        let err = from_value::<Shape>(table("a = 1\nb = 2")).unwrap_err();
        assert!(err.to_string().contains("exactly one key"));
    }

    #[test]
    fn test_datetime_kept_through_value() {
        let doc = table("when = 1979-05-27T07:32:00Z");
        let back: Value = from_value(doc.clone()).unwrap();
        assert_eq!(back, doc);
        assert!(back["when"].is_datetime());
    }

    #[test]
    fn test_datetime_into_string_field() {
        #[derive(Deserialize)]
        struct Stamp {
            when: String,
        }
        let stamp: Stamp = from_value(table("when = 07:32:00")).unwrap();
        assert_eq!(stamp.when, "07:32:00");
    }

    #[test]
    fn test_bigint_into_i128_and_string() {
        let doc = table("wide = 170141183460469231731687303715884105727");
        let wide: HashMap<String, i128> = from_value(doc).unwrap();
        assert_eq!(wide["wide"], i128::MAX);

        let doc = table("huge = 999999999999999999999999999999999999999999");
        let huge: HashMap<String, String> = from_value(doc).unwrap();
        assert_eq!(huge["huge"], "999999999999999999999999999999999999999999");
    }
}
