// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf wire format primitives: wire types, varints, zigzag and tags.
//!
//! Writers append to a `Vec<u8>`; the matching readers live on
//! [`WireCursor`](super::cursor::WireCursor).

use std::fmt;
use std::ops::RangeInclusive;

/// Smallest valid field number.
pub const MIN_FIELD_NUMBER: u32 = 1;
/// Largest valid field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;
/// Field numbers reserved for the protobuf implementation.
pub const RESERVED_FIELD_NUMBERS: RangeInclusive<u32> = 19_000..=19_999;

/// A varint never needs more than this many bytes for a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Wire type of a field frame, the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    SixtyFourBit = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    ThirtyTwoBit = 5,
}

impl WireType {
    /// Convert the low three bits of a tag. Values 6 and 7 are invalid.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(WireType::Varint),
            1 => Some(WireType::SixtyFourBit),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::ThirtyTwoBit),
            _ => None,
        }
    }

    /// Numeric value on the wire.
    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::SixtyFourBit => "64-bit",
            WireType::LengthDelimited => "length-delimited",
            WireType::StartGroup => "start-group",
            WireType::EndGroup => "end-group",
            WireType::ThirtyTwoBit => "32-bit",
        };
        write!(f, "{name} ({})", self.as_raw())
    }
}

/// Append `value` as a base-128 varint.
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Number of bytes `value` takes as a varint.
#[inline]
pub fn encoded_len_varint(value: u64) -> usize {
    // Every 7 significant bits add a byte; zero still takes one.
    ((((value | 1).leading_zeros() ^ 63) * 9 + 73) / 64) as usize
}

#[inline]
pub fn encode_zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline]
pub fn decode_zigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ (-((value & 1) as i32))
}

#[inline]
pub fn encode_zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn decode_zigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}

/// Append the tag for field `number` with `wire_type`.
#[inline]
pub fn encode_tag(number: u32, wire_type: WireType, buf: &mut Vec<u8>) {
    debug_assert!((MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&number));
    encode_varint(u64::from(number << 3 | u32::from(wire_type.as_raw())), buf);
}

/// Number of bytes the tag of field `number` takes.
#[inline]
pub fn tag_len(number: u32) -> usize {
    encoded_len_varint(u64::from(number << 3))
}

/// Append a length prefix followed by `payload`.
pub fn encode_length_delimited(payload: &[u8], buf: &mut Vec<u8>) {
    encode_varint(payload.len() as u64, buf);
    buf.extend_from_slice(payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_varint() {
        let mut buf = Vec::new();
        encode_varint(0, &mut buf);
        assert_eq!(buf, [0x00]);

        buf.clear();
        encode_varint(150, &mut buf);
        assert_eq!(buf, [0x96, 0x01]);

        buf.clear();
        encode_varint(u64::MAX, &mut buf);
        assert_eq!(buf.len(), MAX_VARINT_LEN);
        assert_eq!(buf[9], 0x01);
    }

    #[test]
    fn test_encoded_len_varint_matches_encoding() {
        for value in [0u64, 1, 127, 128, 16_383, 16_384, 1 << 35, u64::MAX - 1, u64::MAX] {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            assert_eq!(encoded_len_varint(value), buf.len(), "value {value}");
        }
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(encode_zigzag32(0), 0);
        assert_eq!(encode_zigzag32(-1), 1);
        assert_eq!(encode_zigzag32(1), 2);
        assert_eq!(encode_zigzag32(i32::MIN), u32::MAX);
        assert_eq!(decode_zigzag32(u32::MAX), i32::MIN);
        assert_eq!(encode_zigzag64(-2), 3);
        assert_eq!(decode_zigzag64(3), -2);
        assert_eq!(decode_zigzag64(encode_zigzag64(i64::MAX)), i64::MAX);
    }

    #[test]
    fn test_encode_tag() {
        let mut buf = Vec::new();
        encode_tag(1, WireType::Varint, &mut buf);
        assert_eq!(buf, [0x08]);

        buf.clear();
        encode_tag(2, WireType::LengthDelimited, &mut buf);
        assert_eq!(buf, [0x12]);

        buf.clear();
        encode_tag(16, WireType::Varint, &mut buf);
        assert_eq!(buf, [0x80, 0x01]);
        assert_eq!(tag_len(16), 2);
        assert_eq!(tag_len(MAX_FIELD_NUMBER), 5);
    }

    #[test]
    fn test_wire_type_from_raw() {
        assert_eq!(WireType::from_raw(5), Some(WireType::ThirtyTwoBit));
        assert_eq!(WireType::from_raw(6), None);
        assert_eq!(WireType::from_raw(7), None);
        assert_eq!(WireType::StartGroup.as_raw(), 3);
    }
}
