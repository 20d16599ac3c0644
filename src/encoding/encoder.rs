// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protobuf Encoder
//!
//! Encodes a [`DynamicMessage`] to the protobuf binary wire format.
//!
//! Populated fields are written in ascending field-number order, extensions
//! interleaved by number, followed by the unknown fields exactly as they were
//! read. Unset fields produce no bytes. In deterministic mode map entries are
//! written in [`MapKey`] order, so structurally equal messages encode to
//! identical bytes.

use std::collections::HashMap;

use tracing::trace;

use super::options::EncodeOptions;
use super::wire::{
    encode_length_delimited, encode_tag, encode_varint, encode_zigzag32, encode_zigzag64,
    encoded_len_varint, tag_len, WireType,
};
use crate::core::{CodecError, MapKey, Result, Value};
use crate::reflect::DynamicMessage;
use crate::schema::{FieldDescriptor, Kind};

/// Protobuf encoder for descriptor-driven encoding.
#[derive(Debug, Clone, Default)]
pub struct ProtobufEncoder {
    options: EncodeOptions,
}

impl ProtobufEncoder {
    /// Create an encoder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with explicit options.
    pub fn with_options(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encode `message` into a new buffer.
    ///
    /// Unless `allow_partial` is set, fails with
    /// [`CodecError::RequiredNotSet`](crate::CodecError::RequiredNotSet) when a
    /// required field is unset anywhere in the message tree. A value whose
    /// type does not match its field fails with
    /// [`CodecError::EncodeError`](crate::CodecError::EncodeError).
    pub fn encode(&self, message: &DynamicMessage) -> Result<Vec<u8>> {
        let mut sizes = SizeCache::default();
        let mut buf = Vec::with_capacity(sizes.message_len(message));
        self.encode_with(message, &mut buf, &mut sizes)?;
        Ok(buf)
    }

    /// Append the encoding of `message` to `buf`.
    pub fn encode_into(&self, message: &DynamicMessage, buf: &mut Vec<u8>) -> Result<()> {
        self.encode_with(message, buf, &mut SizeCache::default())
    }

    /// Exact number of bytes [`encode`](Self::encode) produces.
    pub fn encoded_len(&self, message: &DynamicMessage) -> usize {
        SizeCache::default().message_len(message)
    }

    fn encode_with(
        &self,
        message: &DynamicMessage,
        buf: &mut Vec<u8>,
        sizes: &mut SizeCache,
    ) -> Result<()> {
        if !self.options.allow_partial {
            crate::ops::check_initialized(message)?;
        }
        trace!(
            message_type = message.descriptor().full_name(),
            deterministic = self.options.deterministic,
            "encoding message"
        );
        self.write_message(message, buf, sizes)
    }

    fn write_message(
        &self,
        message: &DynamicMessage,
        buf: &mut Vec<u8>,
        sizes: &mut SizeCache,
    ) -> Result<()> {
        for (field, value) in message.populated_fields() {
            self.write_field(&field, value, buf, sizes)?;
        }
        message.unknown_fields().write_to(buf);
        Ok(())
    }

    fn write_field(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        buf: &mut Vec<u8>,
        sizes: &mut SizeCache,
    ) -> Result<()> {
        match value {
            Value::Map(entries) => {
                let (Some(key_field), Some(value_field)) =
                    (field.map_key_field(), field.map_value_field())
                else {
                    return Err(mismatch(field, &field.kind(), value));
                };
                let mut sorted: Vec<(&MapKey, &Value)> = entries.iter().collect();
                if self.options.deterministic {
                    sorted.sort_by(|a, b| a.0.cmp(b.0));
                }
                let key_kind = key_field.kind();
                let value_kind = value_field.kind();
                for (key, entry_value) in sorted {
                    let key = key.clone().into_value();
                    let entry_len = sizes.single_len(1, &key_kind, false, &key)
                        + sizes.single_len(2, &value_kind, false, entry_value);
                    encode_tag(field.number(), WireType::LengthDelimited, buf);
                    encode_varint(entry_len as u64, buf);
                    self.write_single(&key_field, &key_kind, false, &key, buf, sizes)?;
                    self.write_single(&value_field, &value_kind, false, entry_value, buf, sizes)?;
                }
            }
            Value::List(items) => {
                let kind = field.kind();
                if field.is_packed() {
                    let payload: usize = items.iter().map(|v| scalar_len(&kind, v)).sum();
                    encode_tag(field.number(), WireType::LengthDelimited, buf);
                    encode_varint(payload as u64, buf);
                    for item in items {
                        write_scalar(field, &kind, item, buf)?;
                    }
                } else {
                    for item in items {
                        self.write_single(field, &kind, field.is_group(), item, buf, sizes)?;
                    }
                }
            }
            single => {
                self.write_single(field, &field.kind(), field.is_group(), single, buf, sizes)?;
            }
        }
        Ok(())
    }

    fn write_single(
        &self,
        field: &FieldDescriptor,
        kind: &Kind,
        is_group: bool,
        value: &Value,
        buf: &mut Vec<u8>,
        sizes: &mut SizeCache,
    ) -> Result<()> {
        let number = field.number();
        match value {
            Value::Message(message) => {
                if !value.is_valid_for_kind(kind) {
                    return Err(mismatch(field, kind, value));
                }
                if is_group {
                    encode_tag(number, WireType::StartGroup, buf);
                    self.write_message(message, buf, sizes)?;
                    encode_tag(number, WireType::EndGroup, buf);
                } else {
                    encode_tag(number, WireType::LengthDelimited, buf);
                    encode_varint(sizes.message_len(message) as u64, buf);
                    self.write_message(message, buf, sizes)?;
                }
                Ok(())
            }
            scalar => {
                encode_tag(number, kind.wire_type(), buf);
                write_scalar(field, kind, scalar, buf)
            }
        }
    }
}

fn mismatch(field: &FieldDescriptor, kind: &Kind, value: &Value) -> CodecError {
    CodecError::encode(
        "protobuf",
        format!(
            "{}: {} value stored for {kind:?}",
            field.full_name(),
            value.type_name()
        ),
    )
}

/// Append a scalar's payload (no tag).
fn write_scalar(
    field: &FieldDescriptor,
    kind: &Kind,
    value: &Value,
    buf: &mut Vec<u8>,
) -> Result<()> {
    match (kind, value) {
        (Kind::Double, Value::F64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (Kind::Float, Value::F32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (Kind::Int64, Value::I64(v)) => encode_varint(*v as u64, buf),
        (Kind::Uint64, Value::U64(v)) => encode_varint(*v, buf),
        // Negative int32 values are sign-extended to ten bytes.
        (Kind::Int32, Value::I32(v)) => encode_varint(i64::from(*v) as u64, buf),
        (Kind::Fixed64, Value::U64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (Kind::Fixed32, Value::U32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (Kind::Bool, Value::Bool(v)) => encode_varint(u64::from(*v), buf),
        (Kind::String, Value::String(v)) => encode_length_delimited(v.as_bytes(), buf),
        (Kind::Bytes, Value::Bytes(v)) => encode_length_delimited(v, buf),
        (Kind::Uint32, Value::U32(v)) => encode_varint(u64::from(*v), buf),
        (Kind::Sfixed32, Value::I32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (Kind::Sfixed64, Value::I64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (Kind::Sint32, Value::I32(v)) => encode_varint(u64::from(encode_zigzag32(*v)), buf),
        (Kind::Sint64, Value::I64(v)) => encode_varint(encode_zigzag64(*v), buf),
        (Kind::Enum(_), Value::EnumNumber(v)) => encode_varint(i64::from(*v) as u64, buf),
        _ => return Err(mismatch(field, kind, value)),
    }
    Ok(())
}

/// Payload size of a scalar (no tag). Mismatched values are sized as
/// empty; writing them fails.
fn scalar_len(kind: &Kind, value: &Value) -> usize {
    match (kind, value) {
        (Kind::Double | Kind::Fixed64 | Kind::Sfixed64, _) => 8,
        (Kind::Float | Kind::Fixed32 | Kind::Sfixed32, _) => 4,
        (Kind::Int64, Value::I64(v)) => encoded_len_varint(*v as u64),
        (Kind::Uint64, Value::U64(v)) => encoded_len_varint(*v),
        (Kind::Int32, Value::I32(v)) => encoded_len_varint(i64::from(*v) as u64),
        (Kind::Bool, _) => 1,
        (Kind::String, Value::String(v)) => encoded_len_varint(v.len() as u64) + v.len(),
        (Kind::Bytes, Value::Bytes(v)) => encoded_len_varint(v.len() as u64) + v.len(),
        (Kind::Uint32, Value::U32(v)) => encoded_len_varint(u64::from(*v)),
        (Kind::Sint32, Value::I32(v)) => encoded_len_varint(u64::from(encode_zigzag32(*v))),
        (Kind::Sint64, Value::I64(v)) => encoded_len_varint(encode_zigzag64(*v)),
        (Kind::Enum(_), Value::EnumNumber(v)) => encoded_len_varint(i64::from(*v) as u64),
        _ => 0,
    }
}

/// Encoded sizes of the messages in one tree, each computed once.
///
/// Keyed by address. The tree stays borrowed for the whole encode, so
/// addresses are stable.
#[derive(Default)]
struct SizeCache {
    lens: HashMap<*const DynamicMessage, usize>,
}

impl SizeCache {
    fn message_len(&mut self, message: &DynamicMessage) -> usize {
        let key: *const DynamicMessage = message;
        if let Some(&len) = self.lens.get(&key) {
            return len;
        }
        let len = message
            .populated_fields()
            .map(|(field, value)| self.field_len(&field, value))
            .sum::<usize>()
            + message.unknown_fields().encoded_len();
        self.lens.insert(key, len);
        len
    }

    /// Size of one tagged value.
    fn single_len(&mut self, number: u32, kind: &Kind, is_group: bool, value: &Value) -> usize {
        match value {
            Value::Message(message) if is_group => 2 * tag_len(number) + self.message_len(message),
            Value::Message(message) => {
                let len = self.message_len(message);
                tag_len(number) + encoded_len_varint(len as u64) + len
            }
            scalar => tag_len(number) + scalar_len(kind, scalar),
        }
    }

    fn field_len(&mut self, field: &FieldDescriptor, value: &Value) -> usize {
        match value {
            Value::Map(entries) => {
                let (Some(key_field), Some(value_field)) =
                    (field.map_key_field(), field.map_value_field())
                else {
                    return 0;
                };
                let key_kind = key_field.kind();
                let value_kind = value_field.kind();
                entries
                    .iter()
                    .map(|(key, entry_value)| {
                        let entry_len =
                            self.single_len(1, &key_kind, false, &key.clone().into_value())
                                + self.single_len(2, &value_kind, false, entry_value);
                        tag_len(field.number()) + encoded_len_varint(entry_len as u64) + entry_len
                    })
                    .sum()
            }
            Value::List(items) => {
                let kind = field.kind();
                if field.is_packed() {
                    let payload: usize = items.iter().map(|v| scalar_len(&kind, v)).sum();
                    tag_len(field.number()) + encoded_len_varint(payload as u64) + payload
                } else {
                    items
                        .iter()
                        .map(|v| self.single_len(field.number(), &kind, field.is_group(), v))
                        .sum()
                }
            }
            single => self.single_len(field.number(), &field.kind(), field.is_group(), single),
        }
    }
}
