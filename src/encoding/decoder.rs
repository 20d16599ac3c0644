// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protobuf Decoder
//!
//! Decodes the protobuf binary wire format into a [`DynamicMessage`],
//! driven by the message's descriptor.
//!
//! Decoding merges into the target: singular scalars overwrite, embedded
//! messages merge recursively, repeated fields accumulate. Frames whose field
//! number the descriptor does not declare are kept verbatim as unknown
//! fields. Decoding is not transactional; a message that saw an error holds
//! whatever was read before it.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protocodec::encoding::ProtobufDecoder;
//! use protocodec::schema::DescriptorPool;
//!
//! # let fds_bytes = vec![0u8; 0];
//! let pool = DescriptorPool::decode(&fds_bytes)?;
//! let descriptor = pool.get_message_by_name("pkg.Item").unwrap();
//! let message = ProtobufDecoder::new().decode(&descriptor, &[0x08, 0x05])?;
//! # Ok(())
//! # }
//! ```

use tracing::{trace, warn};

use super::cursor::WireCursor;
use super::options::DecodeOptions;
use super::wire::{decode_zigzag32, decode_zigzag64, encode_tag, encode_varint, WireType};
use crate::core::{CodecError, MapKey, Result, Value};
use crate::reflect::{DynamicMessage, UnknownField};
use crate::schema::{FieldDescriptor, Kind, MessageDescriptor, Syntax};

/// Protobuf decoder for descriptor-driven decoding.
#[derive(Debug, Clone, Default)]
pub struct ProtobufDecoder {
    options: DecodeOptions,
}

impl ProtobufDecoder {
    /// Create a decoder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with explicit options.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode `data` into a new message of type `descriptor`.
    pub fn decode(&self, descriptor: &MessageDescriptor, data: &[u8]) -> Result<DynamicMessage> {
        let mut message = DynamicMessage::new(descriptor.clone());
        self.merge_into(&mut message, data)?;
        Ok(message)
    }

    /// Decode `data` and merge it into `message`.
    pub fn merge_into(&self, message: &mut DynamicMessage, data: &[u8]) -> Result<()> {
        trace!(
            message_type = message.descriptor().full_name(),
            bytes = data.len(),
            "decoding message"
        );
        let mut cursor = WireCursor::new(data);
        self.merge_message(message, &mut cursor, self.options.recursion_limit, None)
    }

    /// Read frames into `message` until the cursor is exhausted, or, for a
    /// group, until its end tag.
    fn merge_message(
        &self,
        message: &mut DynamicMessage,
        cursor: &mut WireCursor<'_>,
        depth: u32,
        group: Option<u32>,
    ) -> Result<()> {
        while !cursor.is_empty() {
            let frame_start = cursor.offset();
            let tag_pos = cursor.position();
            let (number, wire_type) = cursor.read_tag()?;

            if wire_type == WireType::EndGroup {
                return match group {
                    Some(expected) if expected == number => Ok(()),
                    _ => Err(CodecError::UnexpectedEndGroup {
                        field_number: number,
                        cursor_pos: tag_pos,
                    }),
                };
            }

            let field = message.descriptor().get_field(number);
            match field {
                Some(field) => {
                    let frame = Frame {
                        wire_type,
                        start: frame_start,
                        tag_pos,
                    };
                    self.merge_field(message, &field, frame, cursor, depth)?;
                }
                None => {
                    cursor
                        .skip_field(number, wire_type, depth)
                        .map_err(|e| self.with_limit(e))?;
                    if !self.options.discard_unknown {
                        message.unknown_fields_mut().push(UnknownField::new(
                            number,
                            wire_type,
                            cursor.slice_from(frame_start).to_vec(),
                        ));
                    }
                }
            }
        }

        match group {
            // Input ended inside a group.
            Some(_) => Err(CodecError::buffer_too_short(1, 0, cursor.position())),
            None => Ok(()),
        }
    }

    fn merge_field(
        &self,
        message: &mut DynamicMessage,
        field: &FieldDescriptor,
        frame: Frame,
        cursor: &mut WireCursor<'_>,
        depth: u32,
    ) -> Result<()> {
        let kind = field.kind();

        if field.is_map() {
            frame.expect(field, WireType::LengthDelimited, false)?;
            let mut entry = cursor.read_nested()?;
            match self.read_map_entry(field, &mut entry, depth)? {
                Some((key, value)) => {
                    message.get_map_mut(field)?.insert(key, value)?;
                }
                None => self.keep_unknown(
                    message,
                    field.number(),
                    WireType::LengthDelimited,
                    cursor.slice_from(frame.start),
                ),
            }
            return Ok(());
        }

        if field.is_list() {
            if frame.wire_type == WireType::LengthDelimited && kind.is_packable() {
                let mut packed = cursor.read_nested()?;
                while !packed.is_empty() {
                    let value = self.read_scalar(field, &kind, &mut packed)?;
                    if self.is_unknown_enum(&kind, &value) {
                        let mut raw = Vec::new();
                        encode_tag(field.number(), WireType::Varint, &mut raw);
                        if let Value::EnumNumber(n) = value {
                            encode_varint(i64::from(n) as u64, &mut raw);
                        }
                        self.keep_unknown(message, field.number(), WireType::Varint, &raw);
                    } else {
                        message.get_list_mut(field)?.push(value)?;
                    }
                }
                return Ok(());
            }

            frame.expect(field, field.wire_type(), kind.is_packable())?;
            let value = match &kind {
                Kind::Message(descriptor) => {
                    let mut element = DynamicMessage::new(descriptor.clone());
                    self.read_embedded(field, &mut element, cursor, depth)?;
                    Value::Message(element)
                }
                _ => self.read_scalar(field, &kind, cursor)?,
            };
            if self.is_unknown_enum(&kind, &value) {
                self.keep_unknown(
                    message,
                    field.number(),
                    frame.wire_type,
                    cursor.slice_from(frame.start),
                );
            } else {
                message.get_list_mut(field)?.push(value)?;
            }
            return Ok(());
        }

        frame.expect(field, field.wire_type(), false)?;
        if let Kind::Message(_) = kind {
            let embedded = message.message_slot_mut(field)?;
            return self.read_embedded(field, embedded, cursor, depth);
        }

        let value = self.read_scalar(field, &kind, cursor)?;
        if self.is_unknown_enum(&kind, &value) {
            self.keep_unknown(
                message,
                field.number(),
                frame.wire_type,
                cursor.slice_from(frame.start),
            );
        } else {
            message.clear_oneof_siblings(field);
            message.set_field_raw(field.number(), value);
        }
        Ok(())
    }

    /// Merge an embedded message or group payload into `target`.
    fn read_embedded(
        &self,
        field: &FieldDescriptor,
        target: &mut DynamicMessage,
        cursor: &mut WireCursor<'_>,
        depth: u32,
    ) -> Result<()> {
        let depth = self.descend(depth)?;
        if field.is_group() {
            self.merge_message(target, cursor, depth, Some(field.number()))
        } else {
            let mut nested = cursor.read_nested()?;
            self.merge_message(target, &mut nested, depth, None)
        }
    }

    /// Decode one map entry. `None` means the value is an undeclared number
    /// of a closed enum and the whole entry belongs in the unknown fields.
    fn read_map_entry(
        &self,
        field: &FieldDescriptor,
        entry: &mut WireCursor<'_>,
        depth: u32,
    ) -> Result<Option<(MapKey, Value)>> {
        let (Some(key_field), Some(value_field)) = (field.map_key_field(), field.map_value_field())
        else {
            return Err(CodecError::invalid_schema(
                field.full_name(),
                "map field without key/value entry fields",
            ));
        };
        let key_kind = key_field.kind();
        let value_kind = value_field.kind();

        let mut key = None;
        let mut value = None;
        while !entry.is_empty() {
            let tag_pos = entry.position();
            let (number, wire_type) = entry.read_tag()?;
            let frame = Frame {
                wire_type,
                start: 0,
                tag_pos,
            };
            match number {
                1 => {
                    frame.expect(&key_field, key_kind.wire_type(), false)?;
                    key = Some(self.read_scalar(&key_field, &key_kind, entry)?);
                }
                2 => {
                    frame.expect(&value_field, value_kind.wire_type(), false)?;
                    value = Some(match &value_kind {
                        Kind::Message(descriptor) => {
                            let mut embedded = match value.take() {
                                Some(Value::Message(existing)) => existing,
                                _ => DynamicMessage::new(descriptor.clone()),
                            };
                            self.read_embedded(&value_field, &mut embedded, entry, depth)?;
                            Value::Message(embedded)
                        }
                        _ => self.read_scalar(&value_field, &value_kind, entry)?,
                    });
                }
                _ => entry
                    .skip_field(number, wire_type, depth)
                    .map_err(|e| self.with_limit(e))?,
            }
        }

        let key = match key {
            Some(key) => MapKey::from_value(key),
            None => MapKey::default_for_kind(&key_kind),
        }
        .ok_or_else(|| CodecError::invalid_value(key_field.full_name(), "a map key"))?;
        let value = value.unwrap_or_else(|| value_field.default_value());
        if self.is_unknown_enum(&value_kind, &value) {
            return Ok(None);
        }
        Ok(Some((key, value)))
    }

    /// Read one non-message value of `kind`.
    fn read_scalar(
        &self,
        field: &FieldDescriptor,
        kind: &Kind,
        cursor: &mut WireCursor<'_>,
    ) -> Result<Value> {
        let value = match kind {
            Kind::Double => Value::F64(f64::from_bits(cursor.read_fixed64()?)),
            Kind::Float => Value::F32(f32::from_bits(cursor.read_fixed32()?)),
            Kind::Int64 => Value::I64(cursor.read_varint()? as i64),
            Kind::Uint64 => Value::U64(cursor.read_varint()?),
            // int32 values are truncated from the 64-bit varint
            Kind::Int32 => Value::I32(cursor.read_varint()? as i32),
            Kind::Fixed64 => Value::U64(cursor.read_fixed64()?),
            Kind::Fixed32 => Value::U32(cursor.read_fixed32()?),
            Kind::Bool => Value::Bool(cursor.read_varint()? != 0),
            Kind::Uint32 => Value::U32(cursor.read_varint()? as u32),
            Kind::Sfixed32 => Value::I32(cursor.read_fixed32()? as i32),
            Kind::Sfixed64 => Value::I64(cursor.read_fixed64()? as i64),
            Kind::Sint32 => Value::I32(decode_zigzag32(cursor.read_varint()? as u32)),
            Kind::Sint64 => Value::I64(decode_zigzag64(cursor.read_varint()?)),
            Kind::Enum(_) => Value::EnumNumber(cursor.read_varint()? as i32),
            Kind::String => {
                let bytes = cursor.read_length_delimited()?;
                Value::String(self.read_string(field, bytes)?)
            }
            Kind::Bytes => Value::Bytes(cursor.read_length_delimited()?.to_vec()),
            Kind::Message(_) => {
                return Err(CodecError::invalid_value(
                    field.full_name(),
                    "a scalar field",
                ))
            }
        };
        Ok(value)
    }

    fn read_string(&self, field: &FieldDescriptor, bytes: &[u8]) -> Result<String> {
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) if field.syntax() == Syntax::Proto3 || self.options.strict_utf8 => {
                Err(CodecError::InvalidUtf8 {
                    field_name: field.full_name().to_string(),
                })
            }
            Err(_) => {
                warn!(
                    field = field.full_name(),
                    "invalid UTF-8 in string field, replacing invalid sequences"
                );
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    /// Closed enums keep undeclared numbers out of the field.
    fn is_unknown_enum(&self, kind: &Kind, value: &Value) -> bool {
        match (kind, value) {
            (Kind::Enum(e), Value::EnumNumber(n)) => e.is_closed() && e.get_value(*n).is_none(),
            _ => false,
        }
    }

    fn keep_unknown(
        &self,
        message: &mut DynamicMessage,
        number: u32,
        wire_type: WireType,
        raw: &[u8],
    ) {
        if self.options.discard_unknown {
            return;
        }
        message
            .unknown_fields_mut()
            .push(UnknownField::new(number, wire_type, raw.to_vec()));
    }

    fn descend(&self, depth: u32) -> Result<u32> {
        depth.checked_sub(1).ok_or(CodecError::RecursionLimit {
            limit: self.options.recursion_limit,
        })
    }

    fn with_limit(&self, err: CodecError) -> CodecError {
        match err {
            CodecError::RecursionLimit { .. } => CodecError::RecursionLimit {
                limit: self.options.recursion_limit,
            },
            other => other,
        }
    }
}

/// Position and wire type of the frame being decoded.
#[derive(Debug, Clone, Copy)]
struct Frame {
    wire_type: WireType,
    /// Cursor offset of the frame's tag
    start: usize,
    /// Absolute position of the tag, for errors
    tag_pos: u64,
}

impl Frame {
    /// Check the frame's wire type. Packable repeated fields also accept the
    /// packed (length-delimited) form.
    fn expect(&self, field: &FieldDescriptor, expected: WireType, packable: bool) -> Result<()> {
        if self.wire_type == expected
            || packable && self.wire_type == WireType::LengthDelimited
        {
            return Ok(());
        }
        let expected = if packable {
            format!("{expected} or {}", WireType::LengthDelimited)
        } else {
            expected.to_string()
        };
        Err(CodecError::WireTypeMismatch {
            field_name: field.full_name().to_string(),
            expected,
            actual: self.wire_type.as_raw(),
            cursor_pos: self.tag_pos,
        })
    }
}
