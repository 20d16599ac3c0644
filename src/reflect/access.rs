// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Checked mutable handles into a [`DynamicMessage`].
//!
//! Every write through these handles is validated against the field's
//! descriptor, so a message can only ever hold values its type declares.

use std::collections::HashMap;
use std::ops::Deref;

use super::unknown::UnknownFieldSet;
use super::DynamicMessage;
use crate::core::{CodecError, MapKey, Result, Value};
use crate::schema::{FieldDescriptor, Kind};

/// Elements of a repeated field.
///
/// Reads go through `Deref<Target = [Value]>`.
pub struct ListMut<'a> {
    field: FieldDescriptor,
    kind: Kind,
    items: &'a mut Vec<Value>,
}

impl<'a> ListMut<'a> {
    pub(crate) fn new(field: FieldDescriptor, items: &'a mut Vec<Value>) -> Self {
        let kind = field.kind();
        Self { field, kind, items }
    }

    /// Append an element.
    pub fn push(&mut self, value: Value) -> Result<()> {
        self.check(&value)?;
        self.items.push(value);
        Ok(())
    }

    /// Append all elements, or none if any is of the wrong kind.
    pub fn extend(&mut self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        let values: Vec<Value> = values.into_iter().collect();
        for value in &values {
            self.check(value)?;
        }
        self.items.extend(values);
        Ok(())
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: Value) -> Result<Value> {
        self.check(&value)?;
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(CodecError::invalid_value(
                self.field.full_name(),
                format!("an index below {len}, got {index}"),
            )),
        }
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn check(&self, value: &Value) -> Result<()> {
        if value.is_valid_for_kind(&self.kind) {
            Ok(())
        } else {
            Err(CodecError::invalid_value(
                self.field.full_name(),
                format!("a {:?} element, got {}", self.kind, value.type_name()),
            ))
        }
    }
}

impl Deref for ListMut<'_> {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        self.items
    }
}

/// Entries of a map field.
///
/// Reads go through `Deref<Target = HashMap<MapKey, Value>>`.
pub struct MapMut<'a> {
    field: FieldDescriptor,
    key_kind: Kind,
    value_kind: Kind,
    entries: &'a mut HashMap<MapKey, Value>,
}

impl<'a> MapMut<'a> {
    pub(crate) fn new(
        field: FieldDescriptor,
        entries: &'a mut HashMap<MapKey, Value>,
    ) -> Result<Self> {
        let (Some(key_field), Some(value_field)) = (field.map_key_field(), field.map_value_field())
        else {
            return Err(CodecError::invalid_value(field.full_name(), "a map field"));
        };
        Ok(Self {
            key_kind: key_field.kind(),
            value_kind: value_field.kind(),
            field,
            entries,
        })
    }

    /// Insert or overwrite an entry, returning the previous value.
    pub fn insert(&mut self, key: MapKey, value: Value) -> Result<Option<Value>> {
        if !key.is_valid_for_kind(&self.key_kind) {
            return Err(CodecError::invalid_value(
                self.field.full_name(),
                format!("a {:?} key, got {key:?}", self.key_kind),
            ));
        }
        if !value.is_valid_for_kind(&self.value_kind) {
            return Err(CodecError::invalid_value(
                self.field.full_name(),
                format!("a {:?} value, got {}", self.value_kind, value.type_name()),
            ));
        }
        Ok(self.entries.insert(key, value))
    }

    pub fn remove(&mut self, key: &MapKey) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Deref for MapMut<'_> {
    type Target = HashMap<MapKey, Value>;

    fn deref(&self) -> &HashMap<MapKey, Value> {
        self.entries
    }
}

/// An embedded message, editable field by field.
///
/// The handle cannot replace the message as a whole, so its type always
/// matches the field it lives in.
pub struct MessageMut<'a> {
    message: &'a mut DynamicMessage,
}

impl<'a> MessageMut<'a> {
    pub(crate) fn new(message: &'a mut DynamicMessage) -> Self {
        Self { message }
    }

    pub fn set_field(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        self.message.set_field(field, value)
    }

    pub fn set_field_by_name(&mut self, name: &str, value: Value) -> Result<()> {
        self.message.set_field_by_name(name, value)
    }

    pub fn clear_field(&mut self, field: &FieldDescriptor) {
        self.message.clear_field(field);
    }

    pub fn clear_field_by_name(&mut self, name: &str) {
        self.message.clear_field_by_name(name);
    }

    /// Reset to the empty message of the same type.
    pub fn clear(&mut self) {
        self.message.clear();
    }

    pub fn merge_from_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.message.merge_from_bytes(data)
    }

    pub fn get_list_mut(&mut self, field: &FieldDescriptor) -> Result<ListMut<'_>> {
        self.message.get_list_mut(field)
    }

    pub fn get_map_mut(&mut self, field: &FieldDescriptor) -> Result<MapMut<'_>> {
        self.message.get_map_mut(field)
    }

    pub fn get_message_mut(&mut self, field: &FieldDescriptor) -> Result<MessageMut<'_>> {
        self.message.get_message_mut(field)
    }

    pub fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        self.message.unknown_fields_mut()
    }
}

impl Deref for MessageMut<'_> {
    type Target = DynamicMessage;

    fn deref(&self) -> &DynamicMessage {
        self.message
    }
}
