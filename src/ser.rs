//! Serde serialization into [`Value`].
//!
//! [`ValueSerializer`] turns any `Serialize` type into the dynamic [`Value`]
//! tree; [`to_string`](crate::to_string) then hands that tree to the
//! stringifier. Keeping the two steps apart means the layout rules live in
//! one place, whether the document came from the parser or from a struct.
//!
//! ## Mapping
//!
//! - integers that fit in `i64` become [`Value::Integer`], wider ones
//!   [`Value::BigInt`]
//! - `None` and `()` become [`Value::Null`], which the stringifier skips
//! - unit variants become their name as a string
//! - newtype, tuple and struct variants become a one-key table
//!   `{ Variant = ... }`
//! - map keys must serialize as strings
//!
//! ```rust
//! use serde::Serialize;
//! use toml_cursor::{to_value, Value};
//!
//! #[derive(Serialize)]
//! struct Server { host: String, port: u16 }
//!
//! let value = to_value(&Server { host: "localhost".into(), port: 8080 }).unwrap();
//! assert_eq!(value["host"].as_str(), Some("localhost"));
//! assert_eq!(value["port"], Value::Integer(8080));
//! ```

use num_bigint::BigInt;
use serde::ser::{self, Serialize};

use crate::datetime::DATETIME_NEWTYPE;
use crate::{Array, Datetime, Error, Result, Table, Value};

/// Serializes a Rust value into a [`Value`].
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for map keys that are not strings and
/// [`Error::Custom`] for errors raised by the type's own `Serialize` impl.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    value.serialize(ValueSerializer)
}

/// A serde [`Serializer`](serde::Serializer) whose output is a [`Value`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueSerializer;

#[doc(hidden)]
pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

#[doc(hidden)]
pub struct SerializeMap {
    table: Table,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

/// Wraps `value` as `{ variant = value }`.
fn tagged(variant: &'static str, value: Value) -> Value {
    let mut table = Table::inline();
    table.insert(variant.to_string(), value);
    Value::Table(table)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(match i64::try_from(v) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::BigInt(BigInt::from(v)),
        })
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(match i64::try_from(v) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::BigInt(BigInt::from(v)),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().copied().map(Value::from).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self)?;
        if name != DATETIME_NEWTYPE {
            return Ok(inner);
        }
        match inner {
            Value::String(text) => text
                .parse::<Datetime>()
                .map(Value::Datetime)
                .map_err(Error::custom),
            other => Err(Error::type_mismatch("datetime", other.kind().as_str())),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let array = Value::Array(Array::from(self.vec));
        match self.variant {
            Some(variant) => tagged(variant, array),
            None => array,
        }
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            table: Table::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Value {
        let table = Value::Table(self.table);
        match self.variant {
            Some(variant) => tagged(variant, table),
            None => table,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            other => Err(Error::unsupported_type(&format!(
                "{} as a table key",
                other.kind()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.table.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.table.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.table.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Owner {
        name: String,
        nickname: Option<String>,
    }

    #[derive(Serialize)]
    enum Shape {
        Point,
        Circle(f64),
        Pair(i32, i32),
        Rect { w: u8, h: u8 },
    }

    #[test]
    fn test_struct_keeps_field_order() {
        let value = to_value(&Owner {
            name: "Tom".into(),
            nickname: None,
        })
        .unwrap();
        let table = value.as_table().unwrap();
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(keys, vec!["name", "nickname"]);
        assert_eq!(table.get("nickname"), Some(&Value::Null));
    }

    #[test]
    fn test_wide_integers() {
        assert_eq!(to_value(&u64::MAX).unwrap(), Value::BigInt(BigInt::from(u64::MAX)));
        assert_eq!(to_value(&(i64::MAX as u64)).unwrap(), Value::Integer(i64::MAX));
        assert_eq!(to_value(&-5i128).unwrap(), Value::Integer(-5));
        assert_eq!(
            to_value(&i128::MIN).unwrap(),
            Value::BigInt(BigInt::from(i128::MIN))
        );
    }

    #[test]
    fn test_enum_variants_are_externally_tagged() {
        assert_eq!(to_value(&Shape::Point).unwrap(), Value::from("Point"));

        let circle = to_value(&Shape::Circle(1.5)).unwrap();
        assert_eq!(circle["Circle"], Value::Float(1.5));

        let pair = to_value(&Shape::Pair(1, 2)).unwrap();
        assert_eq!(
            pair["Pair"],
            Value::from(vec![Value::from(1), Value::from(2)])
        );

        let rect = to_value(&Shape::Rect { w: 3, h: 4 }).unwrap();
        assert_eq!(rect["Rect"]["h"], Value::Integer(4));
    }

    #[test]
    fn test_datetime_survives_serialization() {
        let dt: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
        assert_eq!(to_value(&dt).unwrap(), Value::Datetime(dt));
    }

    #[test]
    fn test_non_string_map_keys_rejected() {
        let mut map = BTreeMap::new();
        map.insert(1, "one");
        let err = to_value(&map).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)), "{:?}", err);
    }

    #[test]
    fn test_bytes_become_integer_array() {
        let bytes = serde_bytes_like(&[0, 255]);
        assert_eq!(bytes, Value::from(vec![Value::from(0), Value::from(255)]));
    }

    fn serde_bytes_like(bytes: &[u8]) -> Value {
        use serde::Serializer;
        ValueSerializer.serialize_bytes(bytes).unwrap()
    }
}
