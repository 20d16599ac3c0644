// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Structural equality.
//!
//! Messages are equal when they share a descriptor, populate the same fields
//! with equal values and hold byte-identical unknown fields. Floating point
//! NaN equals NaN. Empty lists and maps equal unset ones.

use std::collections::BTreeSet;

use crate::core::{MapKey, Value};
use crate::reflect::DynamicMessage;
use crate::schema::FieldDescriptor;

/// Path reported when the descriptors differ.
pub const TYPE_DIFFERENCE: &str = "@type";
/// Path component reported when the unknown fields differ.
pub const UNKNOWN_DIFFERENCE: &str = "@unknown";

/// Deep structural equality. Messages of different types are never equal.
pub fn equal(a: &DynamicMessage, b: &DynamicMessage) -> bool {
    first_difference(a, b).is_none()
}

/// Path of the first difference between two messages, visiting fields in
/// ascending number order, or `None` if they are equal.
///
/// Paths look like `child.id`, `items[2].id` or `by_key["k"].id`.
pub fn first_difference(a: &DynamicMessage, b: &DynamicMessage) -> Option<String> {
    if a.descriptor() != b.descriptor() {
        return Some(TYPE_DIFFERENCE.to_string());
    }
    message_difference(a, b, "")
}

/// Structural equality of two field values.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    value_difference(a, b, "").is_none()
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

pub(crate) fn field_path(prefix: &str, field: &FieldDescriptor) -> String {
    if field.is_extension() {
        join(prefix, &format!("[{}]", field.full_name()))
    } else {
        join(prefix, field.name())
    }
}

fn populated(message: &DynamicMessage, number: u32) -> Option<&Value> {
    message
        .fields_raw()
        .get(&number)
        .filter(|v| !v.is_empty_container())
}

fn message_difference(a: &DynamicMessage, b: &DynamicMessage, prefix: &str) -> Option<String> {
    let numbers: BTreeSet<u32> = a
        .populated_fields()
        .chain(b.populated_fields())
        .map(|(field, _)| field.number())
        .collect();

    for number in numbers {
        let path = match a.descriptor().get_field(number) {
            Some(field) => field_path(prefix, &field),
            None => join(prefix, &number.to_string()),
        };
        match (populated(a, number), populated(b, number)) {
            (Some(x), Some(y)) => {
                if let Some(diff) = value_difference(x, y, &path) {
                    return Some(diff);
                }
            }
            _ => return Some(path),
        }
    }

    if a.unknown_fields() != b.unknown_fields() {
        return Some(join(prefix, UNKNOWN_DIFFERENCE));
    }
    None
}

fn value_difference(a: &Value, b: &Value, path: &str) -> Option<String> {
    match (a, b) {
        (Value::Message(x), Value::Message(y)) => {
            if x.descriptor() != y.descriptor() {
                return Some(path.to_string());
            }
            message_difference(x, y, path)
        }
        (Value::List(x), Value::List(y)) => {
            if x.len() != y.len() {
                return Some(path.to_string());
            }
            x.iter()
                .zip(y)
                .enumerate()
                .find_map(|(i, (ex, ey))| value_difference(ex, ey, &format!("{path}[{i}]")))
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.len() != y.len() {
                return Some(path.to_string());
            }
            let mut keys: Vec<&MapKey> = x.keys().collect();
            keys.sort();
            keys.into_iter().find_map(|key| {
                let entry_path = format!("{path}[{key}]");
                match (x.get(key), y.get(key)) {
                    (Some(ex), Some(ey)) => value_difference(ex, ey, &entry_path),
                    _ => Some(entry_path),
                }
            })
        }
        _ if scalars_equal(a, b) => None,
        _ => Some(path.to_string()),
    }
}

fn scalars_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::I32(x), Value::I32(y)) => x == y,
        (Value::I64(x), Value::I64(y)) => x == y,
        (Value::U32(x), Value::U32(y)) => x == y,
        (Value::U64(x), Value::U64(y)) => x == y,
        (Value::F32(x), Value::F32(y)) => x == y || x.is_nan() && y.is_nan(),
        (Value::F64(x), Value::F64(y)) => x == y || x.is_nan() && y.is_nan(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::EnumNumber(x), Value::EnumNumber(y)) => x == y,
        _ => false,
    }
}
