// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cursor for reading protobuf wire data.
//!
//! The cursor tracks its position relative to the outermost buffer, so errors
//! raised while reading an embedded message report where in the original
//! input the problem is.
//!
//! # Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protocodec::encoding::cursor::WireCursor;
//! use protocodec::encoding::wire::WireType;
//!
//! let data = [0x08, 0x96, 0x01];
//! let mut cursor = WireCursor::new(&data);
//! assert_eq!(cursor.read_tag()?, (1, WireType::Varint));
//! assert_eq!(cursor.read_varint()?, 150);
//! assert!(cursor.is_empty());
//! # Ok(())
//! # }
//! ```

use super::wire::{WireType, MAX_FIELD_NUMBER, MAX_VARINT_LEN};
use crate::core::{CodecError, Result};

/// Reader over a protobuf-encoded byte slice.
#[derive(Debug, Clone)]
pub struct WireCursor<'a> {
    /// Bytes of this frame (the whole input, or an embedded payload)
    data: &'a [u8],
    /// Read position within `data`
    offset: usize,
    /// Position of `data[0]` within the outermost buffer
    base: u64,
}

impl<'a> WireCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Absolute position in the outermost buffer.
    #[inline]
    pub fn position(&self) -> u64 {
        self.base + self.offset as u64
    }

    /// Read position within this cursor's own slice.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// True once every byte was consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes consumed since `start` (an earlier [`offset`](Self::offset)).
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.data[start.min(self.offset)..self.offset]
    }

    /// Read a base-128 varint of at most ten bytes.
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.position();
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.data.get(self.offset) else {
                return Err(CodecError::buffer_too_short(1, 0, self.position()));
            };
            self.offset += 1;
            // The tenth byte may only carry the single remaining bit.
            if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
                return Err(CodecError::InvalidVarint { cursor_pos: start });
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte < 0x80 {
                return Ok(value);
            }
        }
        Err(CodecError::InvalidVarint { cursor_pos: start })
    }

    /// Read a tag, validating its field number and wire type.
    pub fn read_tag(&mut self) -> Result<(u32, WireType)> {
        let start = self.position();
        let raw = self.read_varint()?;
        if raw > u64::from(u32::MAX) {
            return Err(CodecError::invalid_tag(raw, start, "tag exceeds 32 bits"));
        }
        let Some(wire_type) = WireType::from_raw((raw & 0x07) as u8) else {
            return Err(CodecError::invalid_tag(
                raw,
                start,
                format!("invalid wire type {}", raw & 0x07),
            ));
        };
        let number = (raw >> 3) as u32;
        if number == 0 {
            return Err(CodecError::invalid_tag(raw, start, "field number 0"));
        }
        if number > MAX_FIELD_NUMBER {
            return Err(CodecError::invalid_tag(
                raw,
                start,
                format!("field number {number} out of range"),
            ));
        }
        Ok((number, wire_type))
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::buffer_too_short(
                n,
                self.remaining(),
                self.position(),
            ));
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Read a little-endian 32-bit value.
    pub fn read_fixed32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian 64-bit value.
    pub fn read_fixed64(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        let mut array = [0u8; 8];
        array.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(array))
    }

    /// Read a varint length prefix and the payload it announces.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let prefix_pos = self.offset;
        let length = self.read_varint()?;
        if length > self.remaining() as u64 {
            return Err(CodecError::length_exceeded(
                usize::try_from(length).unwrap_or(usize::MAX),
                prefix_pos,
                self.data.len(),
            ));
        }
        self.read_bytes(length as usize)
    }

    /// Read a length-delimited payload as a nested cursor.
    pub fn read_nested(&mut self) -> Result<WireCursor<'a>> {
        let payload = self.read_length_delimited()?;
        Ok(WireCursor {
            data: payload,
            offset: 0,
            base: self.position() - payload.len() as u64,
        })
    }

    /// Skip the payload of a frame whose tag was just read.
    ///
    /// Groups are skipped up to and including their matching end tag; nested
    /// groups count against `depth`.
    pub fn skip_field(&mut self, number: u32, wire_type: WireType, depth: u32) -> Result<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::SixtyFourBit => {
                self.read_bytes(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::ThirtyTwoBit => {
                self.read_bytes(4)?;
            }
            WireType::StartGroup => {
                if depth == 0 {
                    return Err(CodecError::RecursionLimit { limit: 0 });
                }
                loop {
                    let tag_pos = self.position();
                    let (inner, inner_type) = self.read_tag()?;
                    if inner_type == WireType::EndGroup {
                        if inner != number {
                            return Err(CodecError::UnexpectedEndGroup {
                                field_number: inner,
                                cursor_pos: tag_pos,
                            });
                        }
                        break;
                    }
                    self.skip_field(inner, inner_type, depth - 1)?;
                }
            }
            WireType::EndGroup => {
                return Err(CodecError::UnexpectedEndGroup {
                    field_number: number,
                    cursor_pos: self.position(),
                });
            }
        }
        Ok(())
    }
}
