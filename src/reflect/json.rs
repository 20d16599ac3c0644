// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON view of dynamic messages for diagnostics.
//!
//! Field names are used as keys (extensions as `[full.name]`), enums print
//! their value name when declared, bytes and unknown fields print as hex.
//! This is a debugging aid, not the canonical proto3 JSON mapping.

use serde_json::{Map, Number};

use super::DynamicMessage;
use crate::core::{MapKey, Value};
use crate::schema::{FieldDescriptor, Kind};

/// Key holding the hex-encoded unknown fields.
pub const UNKNOWN_FIELDS_KEY: &str = "@unknown";

impl DynamicMessage {
    /// Render this message as a JSON object.
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut object = Map::new();
        for (field, value) in self.populated_fields() {
            object.insert(json_key(&field), field_to_json(&field, value));
        }
        if !self.unknown_fields().is_empty() {
            object.insert(
                UNKNOWN_FIELDS_KEY.to_string(),
                serde_json::Value::String(hex::encode(self.unknown_fields().raw_bytes())),
            );
        }
        serde_json::Value::Object(object)
    }
}

fn json_key(field: &FieldDescriptor) -> String {
    if field.is_extension() {
        format!("[{}]", field.full_name())
    } else {
        field.name().to_string()
    }
}

fn field_to_json(field: &FieldDescriptor, value: &Value) -> serde_json::Value {
    match value {
        Value::Map(entries) => {
            let value_kind = field.map_value_field().map(|f| f.kind());
            let mut sorted: Vec<(&MapKey, &Value)> = entries.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let mut object = Map::new();
            for (key, entry) in sorted {
                let rendered = match &value_kind {
                    Some(kind) => value_to_json(kind, entry),
                    None => serde_json::Value::Null,
                };
                object.insert(map_key_to_string(key), rendered);
            }
            serde_json::Value::Object(object)
        }
        Value::List(items) => {
            let kind = field.kind();
            serde_json::Value::Array(items.iter().map(|v| value_to_json(&kind, v)).collect())
        }
        other => value_to_json(&field.kind(), other),
    }
}

fn map_key_to_string(key: &MapKey) -> String {
    match key {
        MapKey::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn float_to_json(v: f64) -> serde_json::Value {
    match Number::from_f64(v) {
        Some(n) => serde_json::Value::Number(n),
        None if v.is_nan() => serde_json::Value::String("NaN".to_string()),
        None if v > 0.0 => serde_json::Value::String("Infinity".to_string()),
        None => serde_json::Value::String("-Infinity".to_string()),
    }
}

fn value_to_json(kind: &Kind, value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::I32(v) => serde_json::Value::from(*v),
        Value::I64(v) => serde_json::Value::from(*v),
        Value::U32(v) => serde_json::Value::from(*v),
        Value::U64(v) => serde_json::Value::from(*v),
        Value::F32(v) => float_to_json(f64::from(*v)),
        Value::F64(v) => float_to_json(*v),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(hex::encode(b)),
        Value::EnumNumber(n) => match kind.as_enum().and_then(|e| e.get_value(*n)) {
            Some(name) => serde_json::Value::String(name.to_string()),
            None => serde_json::Value::from(*n),
        },
        Value::Message(m) => m.to_json_value(),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(|v| value_to_json(kind, v)).collect())
        }
        Value::Map(entries) => {
            let mut object = Map::new();
            for (key, entry) in entries {
                object.insert(map_key_to_string(key), value_to_json(kind, entry));
            }
            serde_json::Value::Object(object)
        }
    }
}
