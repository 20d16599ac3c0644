// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field value type system.
//!
//! [`Value`] is a closed tagged variant over everything a protobuf field can
//! hold: the scalar kinds, enum numbers, embedded messages, lists and maps.
//! The codec and the structural operations match on it exhaustively.

use std::collections::HashMap;
use std::fmt;

use crate::reflect::DynamicMessage;
use crate::schema::{FieldDescriptor, Kind};

/// Value of a single field in a [`DynamicMessage`].
///
/// Repeated fields hold a [`Value::List`] and map fields a [`Value::Map`];
/// the element values follow the field's [`Kind`].
///
/// Equality is structural: floating point NaNs compare equal to each other
/// and embedded messages compare with [`crate::ops::equal`].
#[derive(Debug, Clone)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `int32`, `sint32`, `sfixed32`
    I32(i32),
    /// `int64`, `sint64`, `sfixed64`
    I64(i64),
    /// `uint32`, `fixed32`
    U32(u32),
    /// `uint64`, `fixed64`
    U64(u64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `string` (always valid UTF-8)
    String(String),
    /// `bytes`
    Bytes(Vec<u8>),
    /// Enum value by number; the number need not be declared for open enums
    EnumNumber(i32),
    /// Embedded message or group
    Message(DynamicMessage),
    /// Repeated field elements
    List(Vec<Value>),
    /// Map field entries
    Map(HashMap<MapKey, Value>),
}

/// Key of a map field entry.
///
/// The derived ordering is the deterministic map order: `false < true`,
/// integers numerically, strings byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    /// `bool` key
    Bool(bool),
    /// `int32`, `sint32`, `sfixed32` key
    I32(i32),
    /// `int64`, `sint64`, `sfixed64` key
    I64(i64),
    /// `uint32`, `fixed32` key
    U32(u32),
    /// `uint64`, `fixed64` key
    U64(u64),
    /// `string` key
    String(String),
}

impl Value {
    /// Default value for a singular field of the given kind.
    ///
    /// Message kinds produce an empty message.
    pub fn default_for_kind(kind: &Kind) -> Value {
        match kind {
            Kind::Double => Value::F64(0.0),
            Kind::Float => Value::F32(0.0),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(0),
            Kind::Uint32 | Kind::Fixed32 => Value::U32(0),
            Kind::Uint64 | Kind::Fixed64 => Value::U64(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum(e) => Value::EnumNumber(e.default_number()),
            Kind::Message(m) => Value::Message(DynamicMessage::new(m.clone())),
        }
    }

    /// Default value for a field, honoring declared defaults and cardinality.
    pub fn default_for_field(field: &FieldDescriptor) -> Value {
        if field.is_map() {
            Value::Map(HashMap::new())
        } else if field.is_list() {
            Value::List(Vec::new())
        } else {
            field.default_value()
        }
    }

    /// Check whether this value can be stored as a single element of `kind`.
    pub fn is_valid_for_kind(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::F64(_), Kind::Double)
            | (Value::F32(_), Kind::Float)
            | (Value::I32(_), Kind::Int32 | Kind::Sint32 | Kind::Sfixed32)
            | (Value::I64(_), Kind::Int64 | Kind::Sint64 | Kind::Sfixed64)
            | (Value::U32(_), Kind::Uint32 | Kind::Fixed32)
            | (Value::U64(_), Kind::Uint64 | Kind::Fixed64)
            | (Value::Bool(_), Kind::Bool)
            | (Value::String(_), Kind::String)
            | (Value::Bytes(_), Kind::Bytes)
            | (Value::EnumNumber(_), Kind::Enum(_)) => true,
            (Value::Message(m), Kind::Message(d)) => m.descriptor() == d,
            _ => false,
        }
    }

    /// Check whether this value can be stored in `field` as a whole.
    pub fn is_valid_for_field(&self, field: &FieldDescriptor) -> bool {
        if field.is_map() {
            let (Some(key_field), Some(value_field)) =
                (field.map_key_field(), field.map_value_field())
            else {
                return false;
            };
            match self {
                Value::Map(entries) => entries.iter().all(|(k, v)| {
                    k.is_valid_for_kind(&key_field.kind()) && v.is_valid_for_kind(&value_field.kind())
                }),
                _ => false,
            }
        } else if field.is_list() {
            let kind = field.kind();
            match self {
                Value::List(items) => items.iter().all(|v| v.is_valid_for_kind(&kind)),
                _ => false,
            }
        } else {
            self.is_valid_for_kind(&field.kind())
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Check if this value is a container (list or map).
    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// True for empty lists and maps, which are equivalent to an absent field.
    pub fn is_empty_container(&self) -> bool {
        match self {
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the enum number.
    pub fn as_enum_number(&self) -> Option<i32> {
        match self {
            Value::EnumNumber(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the embedded message.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the embedded message.
    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get the list elements.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the list elements.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get the map entries.
    pub fn as_map(&self) -> Option<&HashMap<MapKey, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the map entries.
    pub fn as_map_mut(&mut self) -> Option<&mut HashMap<MapKey, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::ops::equal::values_equal(self, other)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<DynamicMessage> for Value {
    fn from(v: DynamicMessage) -> Self {
        Value::Message(v)
    }
}

impl MapKey {
    /// Default key for the given key kind, used when an entry omits its key.
    pub fn default_for_kind(kind: &Kind) -> Option<MapKey> {
        match kind {
            Kind::Bool => Some(MapKey::Bool(false)),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Some(MapKey::I32(0)),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Some(MapKey::I64(0)),
            Kind::Uint32 | Kind::Fixed32 => Some(MapKey::U32(0)),
            Kind::Uint64 | Kind::Fixed64 => Some(MapKey::U64(0)),
            Kind::String => Some(MapKey::String(String::new())),
            _ => None,
        }
    }

    /// Check whether this key fits the key field kind.
    pub fn is_valid_for_kind(&self, kind: &Kind) -> bool {
        self.clone().into_value().is_valid_for_kind(kind)
    }

    /// Convert a scalar value into a map key.
    pub fn from_value(value: Value) -> Option<MapKey> {
        match value {
            Value::Bool(v) => Some(MapKey::Bool(v)),
            Value::I32(v) => Some(MapKey::I32(v)),
            Value::I64(v) => Some(MapKey::I64(v)),
            Value::U32(v) => Some(MapKey::U32(v)),
            Value::U64(v) => Some(MapKey::U64(v)),
            Value::String(v) => Some(MapKey::String(v)),
            _ => None,
        }
    }

    /// Convert this key into the equivalent scalar value.
    pub fn into_value(self) -> Value {
        match self {
            MapKey::Bool(v) => Value::Bool(v),
            MapKey::I32(v) => Value::I32(v),
            MapKey::I64(v) => Value::I64(v),
            MapKey::U32(v) => Value::U32(v),
            MapKey::U64(v) => Value::U64(v),
            MapKey::String(v) => Value::String(v),
        }
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        MapKey::String(v.to_string())
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(v) => write!(f, "{v}"),
            MapKey::I32(v) => write!(f, "{v}"),
            MapKey::I64(v) => write!(f, "{v}"),
            MapKey::U32(v) => write!(f, "{v}"),
            MapKey::U64(v) => write!(f, "{v}"),
            MapKey::String(v) => write!(f, "{v:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_values_are_equal() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_eq!(Value::F32(f32::NAN), Value::F32(f32::NAN));
        assert_ne!(Value::F64(f64::NAN), Value::F64(1.0));
    }

    #[test]
    fn test_values_of_different_shape_differ() {
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_ne!(Value::I32(1), Value::EnumNumber(1));
        assert_ne!(Value::String("a".into()), Value::Bytes(b"a".to_vec()));
    }

    #[test]
    fn test_map_key_order() {
        let mut keys = vec![
            MapKey::String("b".into()),
            MapKey::String("B".into()),
            MapKey::String("a".into()),
            MapKey::String("ab".into()),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                MapKey::String("B".into()),
                MapKey::String("a".into()),
                MapKey::String("ab".into()),
                MapKey::String("b".into()),
            ]
        );

        let mut ints = vec![MapKey::I32(3), MapKey::I32(-5), MapKey::I32(0)];
        ints.sort();
        assert_eq!(ints, vec![MapKey::I32(-5), MapKey::I32(0), MapKey::I32(3)]);

        assert!(MapKey::Bool(false) < MapKey::Bool(true));
    }

    #[test]
    fn test_map_key_value_conversion() {
        let key = MapKey::from_value(Value::U64(7)).unwrap();
        assert_eq!(key, MapKey::U64(7));
        assert_eq!(key.into_value(), Value::U64(7));
        assert!(MapKey::from_value(Value::F64(1.0)).is_none());
        assert!(MapKey::from_value(Value::Bytes(vec![])).is_none());
    }

    #[test]
    fn test_map_key_display() {
        assert_eq!(MapKey::String("k".into()).to_string(), "\"k\"");
        assert_eq!(MapKey::I64(-2).to_string(), "-2");
        assert_eq!(MapKey::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_empty_container() {
        assert!(Value::List(vec![]).is_empty_container());
        assert!(Value::Map(HashMap::new()).is_empty_container());
        assert!(!Value::List(vec![Value::I32(1)]).is_empty_container());
        assert!(!Value::I32(0).is_empty_container());
    }
}
