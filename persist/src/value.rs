//! Format-agnostic wire value.
//!
//! [`Value`] is what a field codec produces for one field. It is
//! self-describing, so a [`WireComponent`](crate::WireComponent) can be
//! framed by any serde format chosen by the transport layer.
//!
//! [`to_value`] and [`from_value`] bridge arbitrary serde types to and
//! from `Value`; they back the default [`SerdeCodec`](crate::SerdeCodec).

use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};
use serde::ser;
use serde::{Deserialize, Serialize, forward_to_deserialize_any};

use crate::error::CodecError;

/// Opaque wire value for a single component field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    /// Ordered key/value pairs. Structs keep declaration order.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Whether this is [`Value::Null`], the encoding of an unset field.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

/// Convert any `T: Serialize` into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, CodecError> {
    value.serialize(ValueSerializer)
}

/// Convert a [`Value`] back into any `T: DeserializeOwned`.
pub fn from_value<T: de::DeserializeOwned>(value: Value) -> Result<T, CodecError> {
    T::deserialize(value)
}

// ---------------------------------------------------------------------------
// T -> Value
// ---------------------------------------------------------------------------

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = CodecError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = MapBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, CodecError> {
        Ok(Value::Bool(v))
    }
    fn serialize_i8(self, v: i8) -> Result<Value, CodecError> {
        Ok(Value::I64(v.into()))
    }
    fn serialize_i16(self, v: i16) -> Result<Value, CodecError> {
        Ok(Value::I64(v.into()))
    }
    fn serialize_i32(self, v: i32) -> Result<Value, CodecError> {
        Ok(Value::I64(v.into()))
    }
    fn serialize_i64(self, v: i64) -> Result<Value, CodecError> {
        Ok(Value::I64(v))
    }
    fn serialize_u8(self, v: u8) -> Result<Value, CodecError> {
        Ok(Value::U64(v.into()))
    }
    fn serialize_u16(self, v: u16) -> Result<Value, CodecError> {
        Ok(Value::U64(v.into()))
    }
    fn serialize_u32(self, v: u32) -> Result<Value, CodecError> {
        Ok(Value::U64(v.into()))
    }
    fn serialize_u64(self, v: u64) -> Result<Value, CodecError> {
        Ok(Value::U64(v))
    }
    fn serialize_f32(self, v: f32) -> Result<Value, CodecError> {
        Ok(Value::F32(v))
    }
    fn serialize_f64(self, v: f64) -> Result<Value, CodecError> {
        Ok(Value::F64(v))
    }
    fn serialize_char(self, v: char) -> Result<Value, CodecError> {
        Ok(Value::String(v.to_string()))
    }
    fn serialize_str(self, v: &str) -> Result<Value, CodecError> {
        Ok(Value::String(v.to_owned()))
    }
    fn serialize_bytes(self, v: &[u8]) -> Result<Value, CodecError> {
        Ok(Value::Bytes(v.to_vec()))
    }
    fn serialize_none(self) -> Result<Value, CodecError> {
        Ok(Value::Null)
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, CodecError> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Value, CodecError> {
        Ok(Value::Null)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, CodecError> {
        Ok(Value::Null)
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, CodecError> {
        Ok(Value::String(variant.to_owned()))
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, CodecError> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, CodecError> {
        Ok(tagged(variant, value.serialize(ValueSerializer)?))
    }
    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, CodecError> {
        Ok(SeqBuilder::new(len.unwrap_or(0), None))
    }
    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, CodecError> {
        Ok(SeqBuilder::new(len, None))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, CodecError> {
        Ok(SeqBuilder::new(len, None))
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, CodecError> {
        Ok(SeqBuilder::new(len, Some(variant)))
    }
    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, CodecError> {
        Ok(MapBuilder::new(len.unwrap_or(0), None))
    }
    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, CodecError> {
        Ok(MapBuilder::new(len, None))
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<MapBuilder, CodecError> {
        Ok(MapBuilder::new(len, Some(variant)))
    }
}

/// Externally tagged enum payload: `{ variant: inner }`.
fn tagged(variant: &str, inner: Value) -> Value {
    Value::Map(vec![(variant.to_owned(), inner)])
}

struct SeqBuilder {
    items: Vec<Value>,
    variant: Option<&'static str>,
}

impl SeqBuilder {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let list = Value::List(self.items);
        match self.variant {
            Some(variant) => tagged(variant, list),
            None => list,
        }
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.push(value)
    }
    fn end(self) -> Result<Value, CodecError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.push(value)
    }
    fn end(self) -> Result<Value, CodecError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.push(value)
    }
    fn end(self) -> Result<Value, CodecError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.push(value)
    }
    fn end(self) -> Result<Value, CodecError> {
        Ok(self.finish())
    }
}

struct MapBuilder {
    entries: Vec<(String, Value)>,
    pending_key: Option<String>,
    variant: Option<&'static str>,
}

impl MapBuilder {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            pending_key: None,
            variant,
        }
    }

    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<(), CodecError> {
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn finish(self) -> Value {
        let map = Value::Map(self.entries);
        match self.variant {
            Some(variant) => tagged(variant, map),
            None => map,
        }
    }
}

/// Map keys must flatten to text so the wire map stays `(String, Value)`.
fn key_string(key: Value) -> Result<String, CodecError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::I64(n) => Ok(n.to_string()),
        Value::U64(n) => Ok(n.to_string()),
        other => Err(CodecError::new(format!(
            "map key must be a scalar, found {}",
            other.kind()
        ))),
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CodecError> {
        self.pending_key = Some(key_string(key.serialize(ValueSerializer)?)?);
        Ok(())
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| CodecError::new("map value written before its key"))?;
        self.insert(key, value)
    }
    fn end(self) -> Result<Value, CodecError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CodecError> {
        self.insert(key.to_owned(), value)
    }
    fn end(self) -> Result<Value, CodecError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for MapBuilder {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CodecError> {
        self.insert(key.to_owned(), value)
    }
    fn end(self) -> Result<Value, CodecError> {
        Ok(self.finish())
    }
}

// ---------------------------------------------------------------------------
// Value -> T
// ---------------------------------------------------------------------------

impl<'de> IntoDeserializer<'de, CodecError> for Value {
    type Deserializer = Value;

    fn into_deserializer(self) -> Value {
        self
    }
}

impl<'de> de::Deserializer<'de> for Value {
    type Error = CodecError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(v) => visitor.visit_bool(v),
            Value::I64(v) => visitor.visit_i64(v),
            Value::U64(v) => visitor.visit_u64(v),
            Value::F32(v) => visitor.visit_f32(v),
            Value::F64(v) => visitor.visit_f64(v),
            Value::String(v) => visitor.visit_string(v),
            Value::Bytes(v) => visitor.visit_byte_buf(v),
            Value::List(items) => {
                let mut seq: SeqDeserializer<_, CodecError> = SeqDeserializer::new(items.into_iter());
                let out = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(out)
            }
            Value::Map(entries) => {
                let mut map: MapDeserializer<'de, _, CodecError> = MapDeserializer::new(
                    entries.into_iter().map(|(key, value)| (MapKey(key), value)),
                );
                let out = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(out)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        match self {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        match self {
            Value::String(variant) => visitor.visit_enum(EnumValue {
                variant,
                payload: None,
            }),
            Value::Map(mut entries) if entries.len() == 1 => {
                let (variant, payload) = entries.remove(0);
                visitor.visit_enum(EnumValue {
                    variant,
                    payload: Some(payload),
                })
            }
            other => Err(CodecError::new(format!(
                "expected string or single-entry map for enum, found {}",
                other.kind()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

/// A map key read back from its text form.
///
/// Keys are flattened to strings on the way out, so integer and bool keys
/// are parsed again when the target asks for them.
struct MapKey(String);

impl MapKey {
    fn parse<T: std::str::FromStr>(&self, expected: &str) -> Result<T, CodecError> {
        self.0
            .parse()
            .map_err(|_| CodecError::new(format!("map key `{}` is not a valid {expected}", self.0)))
    }
}

impl<'de> IntoDeserializer<'de, CodecError> for MapKey {
    type Deserializer = MapKey;

    fn into_deserializer(self) -> MapKey {
        self
    }
}

macro_rules! deserialize_parsed_key {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for MapKey {
    type Error = CodecError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        visitor.visit_string(self.0)
    }

    deserialize_parsed_key! {
        deserialize_bool => bool, visit_bool;
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        visitor.visit_enum(EnumValue {
            variant: self.0,
            payload: None,
        })
    }

    forward_to_deserialize_any! {
        i128 u128 f32 f64 char str string bytes byte_buf unit unit_struct
        seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct EnumValue {
    variant: String,
    payload: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumValue {
    type Error = CodecError;
    type Variant = VariantPayload;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, VariantPayload), CodecError> {
        let variant = seed.deserialize(Value::String(self.variant))?;
        Ok((variant, VariantPayload(self.payload)))
    }
}

struct VariantPayload(Option<Value>);

impl VariantPayload {
    fn require(self, shape: &str) -> Result<Value, CodecError> {
        self.0
            .ok_or_else(|| CodecError::new(format!("expected {shape} variant, found unit variant")))
    }
}

impl<'de> de::VariantAccess<'de> for VariantPayload {
    type Error = CodecError;

    fn unit_variant(self) -> Result<(), CodecError> {
        match self.0 {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(CodecError::new(format!(
                "expected unit variant, found {}",
                other.kind()
            ))),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, CodecError> {
        seed.deserialize(self.require("newtype")?)
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        de::Deserializer::deserialize_seq(self.require("tuple")?, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        de::Deserializer::deserialize_map(self.require("struct")?, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_map_to_widest_variant() {
        assert_eq!(to_value(&7u8).unwrap(), Value::U64(7));
        assert_eq!(to_value(&-3i16).unwrap(), Value::I64(-3));
        assert_eq!(to_value(&1.5f32).unwrap(), Value::F32(1.5));
        assert_eq!(to_value("hi").unwrap(), Value::String("hi".into()));
        assert_eq!(to_value(&None::<u32>).unwrap(), Value::Null);
    }

    #[test]
    fn numeric_values_narrow_on_decode() {
        assert_eq!(from_value::<u8>(Value::I64(200)).unwrap(), 200);
        assert_eq!(from_value::<i32>(Value::U64(5)).unwrap(), 5);
        assert_eq!(from_value::<f32>(Value::F64(0.25)).unwrap(), 0.25);
        assert!(from_value::<u8>(Value::U64(300)).is_err());
    }

    #[test]
    fn struct_keeps_declaration_order() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Point {
            y: f32,
            x: f32,
        }
        let value = to_value(&Point { y: 2.0, x: 1.0 }).unwrap();
        assert_eq!(
            value,
            Value::Map(vec![
                ("y".into(), Value::F32(2.0)),
                ("x".into(), Value::F32(1.0)),
            ])
        );
        assert_eq!(
            from_value::<Point>(value).unwrap(),
            Point { y: 2.0, x: 1.0 }
        );
    }

    #[test]
    fn enum_variants() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        enum Shape {
            Empty,
            Circle(f32),
            Rect { w: u32, h: u32 },
            Line(i32, i32),
        }
        for shape in [
            Shape::Empty,
            Shape::Circle(0.5),
            Shape::Rect { w: 3, h: 4 },
            Shape::Line(-1, 1),
        ] {
            let value = to_value(&shape).unwrap();
            assert_eq!(from_value::<Shape>(value).unwrap(), shape);
        }
        assert_eq!(
            to_value(&Shape::Empty).unwrap(),
            Value::String("Empty".into())
        );
    }

    #[test]
    fn collections_and_options() {
        let list = to_value(&vec![Some(1u32), None, Some(3)]).unwrap();
        assert_eq!(
            from_value::<Vec<Option<u32>>>(list).unwrap(),
            vec![Some(1), None, Some(3)]
        );

        let mut scores = std::collections::BTreeMap::new();
        scores.insert(2u32, "two".to_string());
        scores.insert(1u32, "one".to_string());
        let value = to_value(&scores).unwrap();
        assert_eq!(
            value,
            Value::Map(vec![
                ("1".into(), Value::String("one".into())),
                ("2".into(), Value::String("two".into())),
            ])
        );
    }

    #[test]
    fn non_string_map_keys_decode() {
        use std::collections::{BTreeMap, HashMap};

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        struct Slot(u16);

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        enum Hand {
            Left,
            Right,
        }

        let by_slot: BTreeMap<u32, String> = [(2, "sword".into()), (10, "shield".into())].into();
        let value = to_value(&by_slot).unwrap();
        assert_eq!(from_value::<BTreeMap<u32, String>>(value).unwrap(), by_slot);

        let flags: HashMap<bool, u8> = [(true, 1), (false, 0)].into();
        let value = to_value(&flags).unwrap();
        assert_eq!(from_value::<HashMap<bool, u8>>(value).unwrap(), flags);

        let offsets: BTreeMap<i64, Slot> = [(-3, Slot(1))].into();
        let value = to_value(&offsets).unwrap();
        assert_eq!(from_value::<BTreeMap<i64, Slot>>(value).unwrap(), offsets);

        let slots: BTreeMap<Slot, Hand> = [(Slot(4), Hand::Left), (Slot(7), Hand::Right)].into();
        let value = to_value(&slots).unwrap();
        assert_eq!(from_value::<BTreeMap<Slot, Hand>>(value).unwrap(), slots);

        let hands: BTreeMap<Hand, u8> = [(Hand::Right, 2)].into();
        let value = to_value(&hands).unwrap();
        assert_eq!(from_value::<BTreeMap<Hand, u8>>(value).unwrap(), hands);
    }

    #[test]
    fn malformed_map_key_is_an_error() {
        let value = Value::Map(vec![("two".into(), Value::U64(2))]);
        let err = from_value::<std::collections::BTreeMap<u32, u64>>(value).unwrap_err();
        assert!(err.message().contains("two"));
    }

    #[test]
    fn list_length_mismatch_is_an_error() {
        let value = Value::List(vec![Value::U64(1), Value::U64(2), Value::U64(3)]);
        assert!(from_value::<(u32, u32)>(value).is_err());
    }
}
