// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Descriptor pool construction and metadata tests.

mod common;

use common::{enum_type, field, item, map_entry, message, pool, record, typed_field};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FileDescriptorProto, FileDescriptorSet, OneofDescriptorProto,
};
use protocodec::encoding::WireType;
use protocodec::schema::{Cardinality, Syntax};
use protocodec::{CodecError, DescriptorPool, Kind, Result, Value};

fn file(syntax: &str, messages: Vec<DescriptorProto>) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("bad.proto".to_string()),
        package: Some("bad".to_string()),
        syntax: Some(syntax.to_string()),
        message_type: messages,
        ..Default::default()
    }
}

fn build(files: Vec<FileDescriptorProto>) -> Result<DescriptorPool> {
    DescriptorPool::from_file_descriptor_set(&FileDescriptorSet { file: files })
}

fn assert_invalid(files: Vec<FileDescriptorProto>, needle: &str) {
    match build(files) {
        Err(CodecError::InvalidSchema { reason, .. }) => {
            assert!(reason.contains(needle), "reason '{reason}' lacks '{needle}'")
        }
        Err(other) => panic!("expected InvalidSchema, got {other:?}"),
        Ok(_) => panic!("schema should not link"),
    }
}

// ============================================================================
// Lookups and metadata
// ============================================================================

#[test]
fn test_pool_lookups() {
    let pool = pool();
    assert!(pool.get_message_by_name("test.Item").is_some());
    assert!(pool.get_message_by_name("Item").is_none());
    assert!(pool.get_enum_by_name("test.Color").is_some());

    let files: Vec<&str> = pool.file_names().collect();
    assert_eq!(files, vec!["test/items.proto", "test/open.proto"]);

    let entry = pool.get_message_by_name("test.Item.CountsEntry").unwrap();
    assert!(entry.is_map_entry());
    assert_eq!(entry.map_entry_key_field().unwrap().name(), "key");
}

#[test]
fn test_message_metadata() {
    let item = item();
    assert_eq!(item.name(), "Item");
    assert_eq!(item.package(), "test");
    assert_eq!(item.file_name(), "test/items.proto");
    assert_eq!(item.syntax(), Syntax::Proto2);
    assert_eq!(record().syntax(), Syntax::Proto3);

    let numbers: Vec<u32> = item.fields().map(|f| f.number()).collect();
    let mut sorted = numbers.clone();
    sorted.sort_unstable();
    assert_eq!(numbers, sorted);

    let required: Vec<String> = item.required_fields().map(|f| f.name().to_string()).collect();
    assert_eq!(required, vec!["id".to_string()]);
}

#[test]
fn test_field_metadata() {
    let item = item();

    let id = item.get_field(1).unwrap();
    assert_eq!(id.full_name(), "test.Item.id");
    assert_eq!(id.kind(), Kind::Int32);
    assert_eq!(id.cardinality(), Cardinality::Required);
    assert!(id.is_required());

    let values = item.get_field_by_name("values").unwrap();
    assert!(values.is_list());
    assert!(values.is_packed());
    assert!(!item.get_field_by_name("colors").unwrap().is_packed());
    assert!(record().get_field_by_name("values").unwrap().is_packed());

    let counts = item.get_field_by_name("counts").unwrap();
    assert!(counts.is_map());
    assert!(!counts.is_list());
    assert_eq!(counts.map_key_field().unwrap().kind(), Kind::String);
    assert_eq!(counts.map_value_field().unwrap().kind(), Kind::Int32);

    let extra = item.get_field_by_name("extra").unwrap();
    assert!(extra.is_group());
    assert_eq!(extra.wire_type(), WireType::StartGroup);

    let text = item.get_field_by_name("text").unwrap();
    assert_eq!(text.containing_oneof().unwrap().name(), "choice");
    assert_eq!(text.containing_message(), item);

    let ratio = item.get_field_by_name("ratio").unwrap();
    assert_eq!(ratio.declared_default(), Some(&Value::F64(1.5)));
    assert_eq!(ratio.default_value(), Value::F64(1.5));

    assert_eq!(item.get_field_by_name("by_key").unwrap().json_name(), "byKey");
}

#[test]
fn test_field_presence() {
    let item = item();
    assert!(item.get_field_by_name("name").unwrap().supports_presence());
    assert!(!item.get_field_by_name("tags").unwrap().supports_presence());

    let record = record();
    assert!(!record.get_field_by_name("id").unwrap().supports_presence());
    assert!(record.get_field_by_name("inner").unwrap().supports_presence());

    let maybe = record.get_field_by_name("maybe").unwrap();
    assert!(maybe.supports_presence());
    assert!(maybe.containing_oneof().unwrap().is_synthetic());
}

#[test]
fn test_enum_metadata() {
    let pool = pool();
    let color = pool.get_enum_by_name("test.Color").unwrap();
    assert!(color.is_closed());
    assert_eq!(color.get_value(1), Some("GREEN"));
    assert_eq!(color.get_value(7), None);
    assert_eq!(color.get_value_by_name("BLUE"), Some(2));
    assert_eq!(color.default_number(), 0);

    let kind = pool.get_enum_by_name("test3.Kind").unwrap();
    assert!(!kind.is_closed());
}

#[test]
fn test_extension_metadata() {
    let item = item();
    let extensions: Vec<_> = item.extensions().collect();
    assert_eq!(extensions.len(), 1);

    let priority = &extensions[0];
    assert_eq!(priority.full_name(), "test.priority");
    assert_eq!(priority.number(), 100);
    assert!(priority.is_extension());
    assert_eq!(priority.containing_message(), item);
    assert_eq!(item.get_field(100).as_ref(), Some(priority));
}

#[test]
fn test_recursive_type() {
    let node = pool().get_message_by_name("test.Node").unwrap();
    let next = node.get_field_by_name("next").unwrap();
    assert_eq!(next.kind().as_message(), Some(&node));
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_files_in_any_order() {
    let mut fds = common::file_descriptor_set();
    fds.file.reverse();
    let pool = DescriptorPool::from_file_descriptor_set(&fds).unwrap();
    assert!(pool.get_message_by_name("test.Item").is_some());
}

#[test]
fn test_relative_type_names_resolve_outward() {
    let outer = DescriptorProto {
        name: Some("Outer".to_string()),
        field: vec![
            typed_field("inner", 1, Label::Optional, Type::Message, "Inner"),
            typed_field("sibling", 2, Label::Optional, Type::Message, "Sibling"),
        ],
        nested_type: vec![message("Inner", vec![])],
        ..Default::default()
    };
    let pool = build(vec![file(
        "proto2",
        vec![outer, message("Sibling", vec![])],
    )])
    .unwrap();

    let outer = pool.get_message_by_name("bad.Outer").unwrap();
    let inner = outer.get_field_by_name("inner").unwrap().kind();
    assert_eq!(inner.as_message().unwrap().full_name(), "bad.Outer.Inner");
    let sibling = outer.get_field_by_name("sibling").unwrap().kind();
    assert_eq!(sibling.as_message().unwrap().full_name(), "bad.Sibling");
}

#[test]
fn test_decode_serialized_set() {
    let pool = DescriptorPool::decode(&common::file_descriptor_set_bytes()).unwrap();
    assert!(pool.get_message_by_name("test3.Record").is_some());
    assert!(DescriptorPool::decode(&[0x0a, 0x05, 0x01]).is_err());
}

// ============================================================================
// Invalid schemas
// ============================================================================

#[test]
fn test_unresolved_type_reference() {
    let holder = message(
        "Holder",
        vec![typed_field("x", 1, Label::Optional, Type::Message, ".bad.Missing")],
    );
    assert_invalid(vec![file("proto2", vec![holder])], "unresolvable");
}

#[test]
fn test_enum_used_as_message() {
    let mut f = file(
        "proto2",
        vec![message(
            "Holder",
            vec![typed_field("x", 1, Label::Optional, Type::Message, ".bad.E")],
        )],
    );
    f.enum_type.push(enum_type("E", &[("A", 0)]));
    assert_invalid(vec![f], "is an enum");
}

#[test]
fn test_duplicate_type_name() {
    let f = file(
        "proto2",
        vec![message("Twice", vec![]), message("Twice", vec![])],
    );
    assert_invalid(vec![f], "more than once");
}

#[test]
fn test_duplicate_field_number_and_name() {
    let numbers = message(
        "M",
        vec![
            field("a", 1, Label::Optional, Type::Int32),
            field("b", 1, Label::Optional, Type::Int32),
        ],
    );
    assert_invalid(vec![file("proto2", vec![numbers])], "field number 1");

    let names = message(
        "M",
        vec![
            field("a", 1, Label::Optional, Type::Int32),
            field("a", 2, Label::Optional, Type::Int32),
        ],
    );
    assert_invalid(vec![file("proto2", vec![names])], "field name 'a'");
}

#[test]
fn test_field_number_bounds() {
    for number in [0, -1, 536_870_912] {
        let m = message("M", vec![field("a", number, Label::Optional, Type::Int32)]);
        assert_invalid(vec![file("proto2", vec![m])], "invalid field number");
    }
    let reserved = message("M", vec![field("a", 19_000, Label::Optional, Type::Int32)]);
    assert_invalid(vec![file("proto2", vec![reserved])], "reserved");

    let max = message("M", vec![field("a", 536_870_911, Label::Optional, Type::Int32)]);
    assert!(build(vec![file("proto2", vec![max])]).is_ok());
}

#[test]
fn test_required_not_allowed_in_proto3() {
    let m = message("M", vec![field("a", 1, Label::Required, Type::Int32)]);
    assert_invalid(vec![file("proto3", vec![m])], "proto3");
}

#[test]
fn test_invalid_map_key() {
    let m = DescriptorProto {
        name: Some("M".to_string()),
        field: vec![typed_field(
            "m",
            1,
            Label::Repeated,
            Type::Message,
            ".bad.M.MEntry",
        )],
        nested_type: vec![map_entry(
            "MEntry",
            field("key", 1, Label::Optional, Type::Double),
            field("value", 2, Label::Optional, Type::Int32),
        )],
        ..Default::default()
    };
    assert_invalid(vec![file("proto2", vec![m])], "map key");
}

#[test]
fn test_enum_without_values() {
    let mut f = file("proto2", vec![]);
    f.enum_type.push(enum_type("E", &[]));
    assert_invalid(vec![f], "at least one value");
}

#[test]
fn test_oneof_index_out_of_range() {
    let mut a = field("a", 1, Label::Optional, Type::Int32);
    a.oneof_index = Some(1);
    let m = DescriptorProto {
        name: Some("M".to_string()),
        field: vec![a],
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("o".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };
    assert_invalid(vec![file("proto2", vec![m])], "out of range");
}

#[test]
fn test_unsupported_syntax() {
    let err = build(vec![file("editions", vec![])]).unwrap_err();
    assert!(matches!(err, CodecError::Unsupported { .. }), "{err:?}");
}

#[test]
fn test_extension_number_conflict() {
    let mut f = file(
        "proto2",
        vec![message("M", vec![field("a", 1, Label::Optional, Type::Int32)])],
    );
    let mut ext = field("clash", 1, Label::Optional, Type::Int32);
    ext.extendee = Some(".bad.M".to_string());
    f.extension.push(ext);
    assert_invalid(vec![f], "conflicts");
}

#[test]
fn test_invalid_default() {
    let mut a = field("a", 1, Label::Optional, Type::Int32);
    a.default_value = Some("abc".to_string());
    assert_invalid(
        vec![file("proto2", vec![message("M", vec![a])])],
        "invalid default",
    );
}
