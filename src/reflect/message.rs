// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reflective message store.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::access::{ListMut, MapMut, MessageMut};
use super::unknown::UnknownFieldSet;
use crate::core::{CodecError, MapKey, Result, Value};
use crate::encoding::{DecodeOptions, EncodeOptions, ProtobufDecoder, ProtobufEncoder};
use crate::schema::{FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor};

/// A message of any type, with fields addressed through its descriptor.
///
/// Only populated fields are stored, so an unset field is distinguishable from
/// one explicitly set to its default. Lists and maps that are empty count as
/// unset.
///
/// Cloning allocates a fresh message of the same type and merges the source
/// into it; the clone shares no mutable state with the original.
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<u32, Value>,
    unknown: UnknownFieldSet,
}

impl DynamicMessage {
    /// Create an empty message of the given type.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
            unknown: UnknownFieldSet::new(),
        }
    }

    /// Decode `data` into a new message with default options.
    pub fn decode(descriptor: MessageDescriptor, data: &[u8]) -> Result<Self> {
        ProtobufDecoder::new().decode(&descriptor, data)
    }

    /// Decode `data` and merge it into this message.
    ///
    /// On error the message may hold part of the input and should be discarded.
    pub fn merge_from_bytes(&mut self, data: &[u8]) -> Result<()> {
        ProtobufDecoder::new().merge_into(self, data)
    }

    /// Encode, failing if a required field is unset.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        ProtobufEncoder::new().encode(self)
    }

    /// Encode with map entries in key order.
    pub fn encode_deterministic(&self) -> Result<Vec<u8>> {
        ProtobufEncoder::with_options(EncodeOptions::deterministic()).encode(self)
    }

    /// Exact size of the encoding, without encoding.
    pub fn encoded_len(&self) -> usize {
        ProtobufEncoder::new().encoded_len(self)
    }

    /// Decode with explicit options.
    pub fn decode_with_options(
        descriptor: MessageDescriptor,
        data: &[u8],
        options: DecodeOptions,
    ) -> Result<Self> {
        ProtobufDecoder::with_options(options).decode(&descriptor, data)
    }

    /// Message type.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// True if no field is populated and no unknown field is held.
    pub fn is_empty(&self) -> bool {
        self.populated_fields().next().is_none() && self.unknown.is_empty()
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// True if the field is populated. Empty lists and maps are not.
    pub fn has_field(&self, field: &FieldDescriptor) -> bool {
        self.fields
            .get(&field.number())
            .is_some_and(|v| !v.is_empty_container())
    }

    /// Value of the field, or its default if unset.
    ///
    /// Unset message fields yield an empty message; use
    /// [`get_message`](Self::get_message) to tell absent from empty.
    pub fn get_field(&self, field: &FieldDescriptor) -> Cow<'_, Value> {
        match self.fields.get(&field.number()) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(Value::default_for_field(field)),
        }
    }

    /// Embedded message of a singular message field, `None` if unset.
    pub fn get_message(&self, field: &FieldDescriptor) -> Option<&DynamicMessage> {
        self.fields.get(&field.number()).and_then(Value::as_message)
    }

    /// Set a field, replacing any previous value.
    ///
    /// Setting a oneof member clears the other members. Setting an empty list
    /// or map clears the field.
    pub fn set_field(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        self.check_owns(field)?;
        if !value.is_valid_for_field(field) {
            return Err(CodecError::invalid_value(
                field.full_name(),
                expected_shape(field),
            ));
        }
        if value.is_empty_container() {
            self.fields.remove(&field.number());
            return Ok(());
        }
        self.clear_oneof_siblings(field);
        self.fields.insert(field.number(), value);
        Ok(())
    }

    /// Unset a field.
    pub fn clear_field(&mut self, field: &FieldDescriptor) {
        self.fields.remove(&field.number());
    }

    /// Reset to the empty message, dropping unknown fields too.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.unknown.clear();
    }

    /// Look up a field by name (or an extension by full name).
    pub fn field_by_name(&self, name: &str) -> Result<FieldDescriptor> {
        self.descriptor.get_field_by_name(name).ok_or_else(|| {
            CodecError::type_not_found(format!("{}.{name}", self.descriptor.full_name()))
        })
    }

    pub fn has_field_by_name(&self, name: &str) -> bool {
        self.descriptor
            .get_field_by_name(name)
            .is_some_and(|f| self.has_field(&f))
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<Cow<'_, Value>> {
        let field = self.descriptor.get_field_by_name(name)?;
        Some(self.get_field(&field))
    }

    pub fn set_field_by_name(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self.field_by_name(name)?;
        self.set_field(&field, value)
    }

    pub fn clear_field_by_name(&mut self, name: &str) {
        if let Some(field) = self.descriptor.get_field_by_name(name) {
            self.clear_field(&field);
        }
    }

    /// Checked handle on the elements of a list field, created empty if unset.
    pub fn get_list_mut(&mut self, field: &FieldDescriptor) -> Result<ListMut<'_>> {
        self.check_owns(field)?;
        if !field.is_list() {
            return Err(CodecError::invalid_value(field.full_name(), "a list field"));
        }
        let slot = self
            .fields
            .entry(field.number())
            .or_insert_with(|| Value::List(Vec::new()));
        let items = slot
            .as_list_mut()
            .ok_or_else(|| CodecError::invalid_value(field.full_name(), "a list value"))?;
        Ok(ListMut::new(field.clone(), items))
    }

    /// Checked handle on the entries of a map field, created empty if unset.
    pub fn get_map_mut(&mut self, field: &FieldDescriptor) -> Result<MapMut<'_>> {
        self.check_owns(field)?;
        if !field.is_map() {
            return Err(CodecError::invalid_value(field.full_name(), "a map field"));
        }
        let slot = self
            .fields
            .entry(field.number())
            .or_insert_with(|| Value::Map(HashMap::new()));
        let entries = slot
            .as_map_mut()
            .ok_or_else(|| CodecError::invalid_value(field.full_name(), "a map value"))?;
        MapMut::new(field.clone(), entries)
    }

    /// Handle on the embedded message of a singular message field, created
    /// empty (and thereby populated) if unset.
    pub fn get_message_mut(&mut self, field: &FieldDescriptor) -> Result<MessageMut<'_>> {
        self.message_slot_mut(field).map(MessageMut::new)
    }

    /// Populated fields in ascending number order, extensions included.
    pub fn populated_fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.fields.iter().filter_map(|(number, value)| {
            if value.is_empty_container() {
                return None;
            }
            self.descriptor
                .get_field(*number)
                .map(|field| (field, value))
        })
    }

    /// The member of `oneof` that is currently set.
    pub fn which_oneof(&self, oneof: &OneofDescriptor) -> Option<FieldDescriptor> {
        oneof.fields().find(|f| self.has_field(f))
    }

    /// Fields the descriptor does not declare, in arrival order.
    pub fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown
    }

    pub fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown
    }

    // =========================================================================
    // Crate-internal access used by the codec and structural operations
    // =========================================================================

    pub(crate) fn fields_raw(&self) -> &BTreeMap<u32, Value> {
        &self.fields
    }

    pub(crate) fn fields_raw_mut(&mut self) -> &mut BTreeMap<u32, Value> {
        &mut self.fields
    }

    /// Embedded message of a singular message field, created if unset.
    pub(crate) fn message_slot_mut(&mut self, field: &FieldDescriptor) -> Result<&mut DynamicMessage> {
        self.check_owns(field)?;
        let Kind::Message(descriptor) = field.kind() else {
            return Err(CodecError::invalid_value(field.full_name(), "a message field"));
        };
        if field.is_list() || field.is_map() {
            return Err(CodecError::invalid_value(
                field.full_name(),
                "a singular message field",
            ));
        }
        if !self.fields.contains_key(&field.number()) {
            self.clear_oneof_siblings(field);
        }
        let slot = self
            .fields
            .entry(field.number())
            .or_insert_with(|| Value::Message(DynamicMessage::new(descriptor)));
        slot.as_message_mut()
            .ok_or_else(|| CodecError::invalid_value(field.full_name(), "a message value"))
    }

    /// Store a value the caller already matched to the field.
    pub(crate) fn set_field_raw(&mut self, number: u32, value: Value) {
        self.fields.insert(number, value);
    }

    /// Unset every other member of the oneof `field` belongs to.
    pub(crate) fn clear_oneof_siblings(&mut self, field: &FieldDescriptor) {
        if let Some(oneof) = field.containing_oneof() {
            for sibling in oneof.fields() {
                if sibling.number() != field.number() {
                    self.fields.remove(&sibling.number());
                }
            }
        }
    }

    fn check_owns(&self, field: &FieldDescriptor) -> Result<()> {
        if field.containing_message() == self.descriptor {
            Ok(())
        } else {
            Err(CodecError::invalid_value(
                field.full_name(),
                format!("a field of '{}'", self.descriptor.full_name()),
            ))
        }
    }
}

fn expected_shape(field: &FieldDescriptor) -> String {
    if field.is_map() {
        match (field.map_key_field(), field.map_value_field()) {
            (Some(k), Some(v)) => format!("map<{:?}, {:?}>", k.kind(), v.kind()),
            _ => "map".to_string(),
        }
    } else if field.is_list() {
        format!("list of {:?}", field.kind())
    } else {
        format!("{:?}", field.kind())
    }
}

impl Clone for DynamicMessage {
    fn clone(&self) -> Self {
        crate::ops::clone_message(self)
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        crate::ops::equal(self, other)
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.descriptor.full_name());
        for (field, value) in self.populated_fields() {
            s.field(field.name(), value);
        }
        if !self.unknown.is_empty() {
            s.field("@unknown", &self.unknown.len());
        }
        s.finish()
    }
}
