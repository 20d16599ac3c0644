// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Unknown field preservation.
//!
//! Frames whose field number the descriptor does not declare are kept as raw
//! bytes, tag included, in arrival order. Re-encoding writes them back
//! unchanged after the known fields.

use crate::encoding::wire::WireType;

/// One preserved frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    number: u32,
    wire_type: WireType,
    raw: Vec<u8>,
}

impl UnknownField {
    /// Create an unknown field from a complete frame (tag and payload).
    pub fn new(number: u32, wire_type: WireType, raw: Vec<u8>) -> Self {
        Self {
            number,
            wire_type,
            raw,
        }
    }

    /// Field number from the frame's tag.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Wire type from the frame's tag.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// The frame exactly as it appeared on the wire.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Ordered sequence of unknown frames.
#[derive(Debug, Clone, Default)]
pub struct UnknownFieldSet {
    fields: Vec<UnknownField>,
}

impl UnknownFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame.
    pub fn push(&mut self, field: UnknownField) {
        self.fields.push(field);
    }

    /// Append every frame of `other`, after the existing ones.
    pub fn extend_from(&mut self, other: &UnknownFieldSet) {
        self.fields.extend(other.fields.iter().cloned());
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &UnknownField> {
        self.fields.iter()
    }

    /// Concatenated raw bytes of every frame.
    pub fn raw_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }

    /// Append every frame to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        for field in &self.fields {
            buf.extend_from_slice(&field.raw);
        }
    }

    pub fn encoded_len(&self) -> usize {
        self.fields.iter().map(|f| f.raw.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

/// Two sets are equal when their concatenated bytes are, regardless of how
/// those bytes are split into frames.
impl PartialEq for UnknownFieldSet {
    fn eq(&self, other: &Self) -> bool {
        if self.encoded_len() != other.encoded_len() {
            return false;
        }
        self.fields
            .iter()
            .flat_map(|f| f.raw.iter())
            .eq(other.fields.iter().flat_map(|f| f.raw.iter()))
    }
}

impl Eq for UnknownFieldSet {}
