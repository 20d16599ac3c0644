// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Required-field completeness.
//!
//! Completeness is computed on every call and never cached, so it always
//! reflects the current contents of the message.

use super::equal::field_path;
use crate::core::{CodecError, MapKey, Result, Value};
use crate::reflect::DynamicMessage;

/// Fail with [`CodecError::RequiredNotSet`] naming the first missing
/// required field.
///
/// Fields are visited in ascending number order, descending into populated
/// embedded messages, list elements (`items[2].id`) and map values
/// (`by_key["k"].id`); extensions are visited last.
pub fn is_initialized(message: &DynamicMessage) -> Result<()> {
    match first_missing(message, "") {
        Some(path) => Err(CodecError::required_not_set(path)),
        None => Ok(()),
    }
}

/// Same as [`is_initialized`]; the encoder's required-field gate.
pub fn check_initialized(message: &DynamicMessage) -> Result<()> {
    is_initialized(message)
}

fn first_missing(message: &DynamicMessage, prefix: &str) -> Option<String> {
    let descriptor = message.descriptor();
    for field in descriptor.fields().chain(descriptor.extensions()) {
        let path = field_path(prefix, &field);
        if field.is_required() && !message.has_field(&field) {
            return Some(path);
        }
        if let Some(missing) = message
            .fields_raw()
            .get(&field.number())
            .and_then(|value| missing_in_value(value, &path))
        {
            return Some(missing);
        }
    }
    None
}

fn missing_in_value(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Message(embedded) => first_missing(embedded, path),
        Value::List(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| missing_in_value(item, &format!("{path}[{i}]"))),
        Value::Map(entries) => {
            let mut keys: Vec<&MapKey> = entries.keys().collect();
            keys.sort();
            keys.into_iter().find_map(|key| {
                entries
                    .get(key)
                    .and_then(|entry| missing_in_value(entry, &format!("{path}[{key}]")))
            })
        }
        _ => None,
    }
}
