// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! Schemas are assembled directly as `FileDescriptorSet` values so the tests
//! need no `protoc` at build time. The shapes mirror these sources:
//!
//! ```proto
//! // test/items.proto
//! syntax = "proto2";
//! package test;
//!
//! enum Color { RED = 0; GREEN = 1; BLUE = 2; }
//!
//! message Child { required int32 id = 1; optional string label = 2; }
//!
//! message Item {
//!   required int32 id = 1;
//!   optional string name = 2;
//!   optional Child child = 3;
//!   repeated int32 values = 4 [packed = true];
//!   repeated Child children = 5;
//!   map<string, int32> counts = 6;
//!   oneof choice { string text = 7; int64 number = 8; }
//!   optional Color color = 9;
//!   repeated Color colors = 10;
//!   optional group Extra = 11 { optional int32 a = 12; }
//!   optional bytes blob = 13;
//!   optional sint64 delta = 14;
//!   optional double ratio = 15 [default = 1.5];
//!   map<int32, Child> by_key = 16;
//!   repeated string tags = 17;
//!   map<int32, Color> palette = 18;
//!   extensions 100 to 199;
//! }
//!
//! message Node { optional int32 value = 1; optional Node next = 2; }
//! message Empty {}
//!
//! extend Item { optional int32 priority = 100; }
//!
//! // test/open.proto
//! syntax = "proto3";
//! package test3;
//!
//! enum Kind { KIND_UNSPECIFIED = 0; KIND_A = 1; }
//!
//! message Record {
//!   int32 id = 1;
//!   string name = 2;
//!   repeated int32 values = 3;
//!   map<string, string> attrs = 4;
//!   Kind kind = 5;
//!   optional int32 maybe = 6;
//!   Record inner = 7;
//! }
//! ```

#![allow(dead_code)]

use std::sync::OnceLock;

use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    descriptor_proto::ExtensionRange, DescriptorProto, EnumDescriptorProto,
    EnumValueDescriptorProto, FieldDescriptorProto, FieldOptions, FileDescriptorProto,
    FileDescriptorSet, MessageOptions, OneofDescriptorProto,
};

use protocodec::{DescriptorPool, DynamicMessage, MessageDescriptor};

// ============================================================================
// Descriptor builders
// ============================================================================

/// Scalar field.
pub fn field(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

/// Message, group or enum field referencing `type_name`.
pub fn typed_field(
    name: &str,
    number: i32,
    label: Label,
    ty: Type,
    type_name: &str,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..field(name, number, label, ty)
    }
}

/// Synthesized map entry type `<Name>Entry`.
pub fn map_entry(name: &str, key: FieldDescriptorProto, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: vec![key, value],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn enum_type(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .map(|(n, v)| EnumValueDescriptorProto {
                name: Some(n.to_string()),
                number: Some(*v),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

// ============================================================================
// Fixture schemas
// ============================================================================

fn items_file() -> FileDescriptorProto {
    let child = message(
        "Child",
        vec![
            field("id", 1, Label::Required, Type::Int32),
            field("label", 2, Label::Optional, Type::String),
        ],
    );

    let mut values = field("values", 4, Label::Repeated, Type::Int32);
    values.options = Some(FieldOptions {
        packed: Some(true),
        ..Default::default()
    });

    let mut text = field("text", 7, Label::Optional, Type::String);
    text.oneof_index = Some(0);
    let mut number = field("number", 8, Label::Optional, Type::Int64);
    number.oneof_index = Some(0);

    let mut ratio = field("ratio", 15, Label::Optional, Type::Double);
    ratio.default_value = Some("1.5".to_string());

    let item = DescriptorProto {
        name: Some("Item".to_string()),
        field: vec![
            field("id", 1, Label::Required, Type::Int32),
            field("name", 2, Label::Optional, Type::String),
            typed_field("child", 3, Label::Optional, Type::Message, ".test.Child"),
            values,
            typed_field("children", 5, Label::Repeated, Type::Message, ".test.Child"),
            typed_field(
                "counts",
                6,
                Label::Repeated,
                Type::Message,
                ".test.Item.CountsEntry",
            ),
            text,
            number,
            typed_field("color", 9, Label::Optional, Type::Enum, ".test.Color"),
            typed_field("colors", 10, Label::Repeated, Type::Enum, ".test.Color"),
            typed_field("extra", 11, Label::Optional, Type::Group, ".test.Item.Extra"),
            field("blob", 13, Label::Optional, Type::Bytes),
            field("delta", 14, Label::Optional, Type::Sint64),
            ratio,
            typed_field(
                "by_key",
                16,
                Label::Repeated,
                Type::Message,
                ".test.Item.ByKeyEntry",
            ),
            field("tags", 17, Label::Repeated, Type::String),
            typed_field(
                "palette",
                18,
                Label::Repeated,
                Type::Message,
                ".test.Item.PaletteEntry",
            ),
        ],
        nested_type: vec![
            map_entry(
                "CountsEntry",
                field("key", 1, Label::Optional, Type::String),
                field("value", 2, Label::Optional, Type::Int32),
            ),
            message("Extra", vec![field("a", 12, Label::Optional, Type::Int32)]),
            map_entry(
                "ByKeyEntry",
                field("key", 1, Label::Optional, Type::Int32),
                typed_field("value", 2, Label::Optional, Type::Message, ".test.Child"),
            ),
            map_entry(
                "PaletteEntry",
                field("key", 1, Label::Optional, Type::Int32),
                typed_field("value", 2, Label::Optional, Type::Enum, ".test.Color"),
            ),
        ],
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("choice".to_string()),
            ..Default::default()
        }],
        extension_range: vec![ExtensionRange {
            start: Some(100),
            end: Some(200),
            ..Default::default()
        }],
        ..Default::default()
    };

    let node = message(
        "Node",
        vec![
            field("value", 1, Label::Optional, Type::Int32),
            typed_field("next", 2, Label::Optional, Type::Message, ".test.Node"),
        ],
    );

    let mut priority = field("priority", 100, Label::Optional, Type::Int32);
    priority.extendee = Some(".test.Item".to_string());

    FileDescriptorProto {
        name: Some("test/items.proto".to_string()),
        package: Some("test".to_string()),
        syntax: Some("proto2".to_string()),
        message_type: vec![child, item, node, message("Empty", vec![])],
        enum_type: vec![enum_type("Color", &[("RED", 0), ("GREEN", 1), ("BLUE", 2)])],
        extension: vec![priority],
        ..Default::default()
    }
}

fn open_file() -> FileDescriptorProto {
    let mut maybe = field("maybe", 6, Label::Optional, Type::Int32);
    maybe.oneof_index = Some(0);
    maybe.proto3_optional = Some(true);

    let record = DescriptorProto {
        name: Some("Record".to_string()),
        field: vec![
            field("id", 1, Label::Optional, Type::Int32),
            field("name", 2, Label::Optional, Type::String),
            field("values", 3, Label::Repeated, Type::Int32),
            typed_field(
                "attrs",
                4,
                Label::Repeated,
                Type::Message,
                ".test3.Record.AttrsEntry",
            ),
            typed_field("kind", 5, Label::Optional, Type::Enum, ".test3.Kind"),
            maybe,
            typed_field("inner", 7, Label::Optional, Type::Message, ".test3.Record"),
        ],
        nested_type: vec![map_entry(
            "AttrsEntry",
            field("key", 1, Label::Optional, Type::String),
            field("value", 2, Label::Optional, Type::String),
        )],
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("_maybe".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("test/open.proto".to_string()),
        package: Some("test3".to_string()),
        syntax: Some("proto3".to_string()),
        message_type: vec![record],
        enum_type: vec![enum_type("Kind", &[("KIND_UNSPECIFIED", 0), ("KIND_A", 1)])],
        ..Default::default()
    }
}

/// Both fixture files in one set.
pub fn file_descriptor_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![items_file(), open_file()],
    }
}

pub fn file_descriptor_set_bytes() -> Vec<u8> {
    file_descriptor_set().encode_to_vec()
}

/// Shared pool. Descriptors compare by pool identity, so every fixture
/// handle comes from this one instance.
pub fn pool() -> DescriptorPool {
    static POOL: OnceLock<DescriptorPool> = OnceLock::new();
    POOL.get_or_init(|| {
        DescriptorPool::from_file_descriptor_set(&file_descriptor_set())
            .expect("fixture schema links")
    })
    .clone()
}

pub fn descriptor(name: &str) -> MessageDescriptor {
    pool()
        .get_message_by_name(name)
        .unwrap_or_else(|| panic!("fixture type {name} missing"))
}

pub fn item() -> MessageDescriptor {
    descriptor("test.Item")
}

pub fn child() -> MessageDescriptor {
    descriptor("test.Child")
}

pub fn record() -> MessageDescriptor {
    descriptor("test3.Record")
}

// ============================================================================
// Message helpers
// ============================================================================

pub fn decode_hex(descriptor: &MessageDescriptor, text: &str) -> DynamicMessage {
    let bytes = hex::decode(text).expect("valid hex");
    DynamicMessage::decode(descriptor.clone(), &bytes)
        .unwrap_or_else(|e| panic!("decode {text}: {e}"))
}

/// `Child { id, label? }`.
pub fn child_message(id: i32, label: Option<&str>) -> DynamicMessage {
    let mut message = child().new_message();
    message
        .set_field_by_name("id", protocodec::Value::I32(id))
        .expect("set id");
    if let Some(label) = label {
        message
            .set_field_by_name("label", protocodec::Value::from(label))
            .expect("set label");
    }
    message
}
