// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire compatibility with prost-reflect.
//!
//! Both implementations load the same `FileDescriptorSet`; messages built in
//! one must decode in the other and re-encode to identical bytes. Maps hold a
//! single entry so encoding order is fixed on both sides.

mod common;

use std::collections::HashMap;

use prost::Message as _;
use prost_reflect::{
    DescriptorPool as ReflectPool, DynamicMessage as ReflectMessage, MapKey as ReflectKey,
    Value as ReflectValue,
};

use common::{child_message, decode_hex, item, record};
use protocodec::{DynamicMessage, MapKey, Value};

fn reflect_pool() -> ReflectPool {
    ReflectPool::from_file_descriptor_set(common::file_descriptor_set())
        .expect("prost-reflect accepts the fixture schema")
}

fn reflect_message(name: &str) -> ReflectMessage {
    let descriptor = reflect_pool()
        .get_message_by_name(name)
        .unwrap_or_else(|| panic!("prost-reflect missing {name}"));
    ReflectMessage::new(descriptor)
}

fn decode_reflect(name: &str, bytes: &[u8]) -> ReflectMessage {
    let descriptor = reflect_pool().get_message_by_name(name).unwrap();
    ReflectMessage::decode(descriptor, bytes).expect("prost-reflect decodes")
}

fn populated_item() -> DynamicMessage {
    let mut message = item().new_message();
    let mut extra = item()
        .get_field_by_name("extra")
        .unwrap()
        .kind()
        .as_message()
        .unwrap()
        .new_message();
    extra.set_field_by_name("a", Value::I32(9)).unwrap();

    let fields = [
        ("id", Value::I32(5)),
        ("name", Value::from("abc")),
        ("child", Value::Message(child_message(7, Some("c")))),
        (
            "values",
            Value::List(vec![Value::I32(1), Value::I32(300), Value::I32(-2)]),
        ),
        (
            "counts",
            Value::Map(HashMap::from([(MapKey::from("k"), Value::I32(3))])),
        ),
        ("text", Value::from("t")),
        ("color", Value::EnumNumber(2)),
        (
            "colors",
            Value::List(vec![Value::EnumNumber(0), Value::EnumNumber(1)]),
        ),
        ("extra", Value::Message(extra)),
        ("blob", Value::Bytes(vec![0, 1, 2])),
        ("delta", Value::I64(-7)),
        ("ratio", Value::F64(2.5)),
        (
            "tags",
            Value::List(vec![Value::from("x"), Value::from("y")]),
        ),
    ];
    for (name, value) in fields {
        message
            .set_field_by_name(name, value)
            .unwrap_or_else(|e| panic!("set {name}: {e}"));
    }
    message
}

#[test]
fn test_protocodec_bytes_decode_in_prost_reflect() {
    let message = populated_item();
    let bytes = message.encode_to_vec().unwrap();

    let decoded = decode_reflect("test.Item", &bytes);
    assert_eq!(decoded.get_field_by_name("id").unwrap().as_i32(), Some(5));
    assert_eq!(decoded.get_field_by_name("name").unwrap().as_str(), Some("abc"));
    assert_eq!(
        decoded.get_field_by_name("delta").unwrap().as_i64(),
        Some(-7)
    );
    assert_eq!(
        decoded.get_field_by_name("color").unwrap().as_enum_number(),
        Some(2)
    );

    let values = decoded.get_field_by_name("values").unwrap();
    let values: Vec<i32> = values
        .as_list()
        .unwrap()
        .iter()
        .filter_map(ReflectValue::as_i32)
        .collect();
    assert_eq!(values, vec![1, 300, -2]);

    let child = decoded.get_field_by_name("child").unwrap();
    let child = child.as_message().unwrap();
    assert_eq!(child.get_field_by_name("id").unwrap().as_i32(), Some(7));

    let extra = decoded.get_field_by_name("extra").unwrap();
    let extra = extra.as_message().unwrap();
    assert_eq!(extra.get_field_by_name("a").unwrap().as_i32(), Some(9));

    let counts = decoded.get_field_by_name("counts").unwrap();
    assert_eq!(
        counts
            .as_map()
            .unwrap()
            .get(&ReflectKey::String("k".to_string())),
        Some(&ReflectValue::I32(3))
    );

    assert_eq!(decoded.encode_to_vec(), bytes);
}

#[test]
fn test_prost_reflect_bytes_decode_in_protocodec() {
    let mut inner = reflect_message("test3.Record");
    inner.set_field_by_name("id", ReflectValue::I32(1));

    let mut source = reflect_message("test3.Record");
    source.set_field_by_name("id", ReflectValue::I32(5));
    source.set_field_by_name("name", ReflectValue::String("x".to_string()));
    source.set_field_by_name(
        "values",
        ReflectValue::List(vec![ReflectValue::I32(1), ReflectValue::I32(2)]),
    );
    source.set_field_by_name(
        "attrs",
        ReflectValue::Map(HashMap::from([(
            ReflectKey::String("k".to_string()),
            ReflectValue::String("v".to_string()),
        )])),
    );
    source.set_field_by_name("kind", ReflectValue::EnumNumber(1));
    source.set_field_by_name("maybe", ReflectValue::I32(0));
    source.set_field_by_name("inner", ReflectValue::Message(inner));
    let bytes = source.encode_to_vec();

    let decoded = DynamicMessage::decode(record(), &bytes).unwrap();
    assert_eq!(decoded.get_field_by_name("id").unwrap().as_i32(), Some(5));
    assert_eq!(decoded.get_field_by_name("name").unwrap().as_str(), Some("x"));
    assert!(decoded.has_field_by_name("maybe"));
    assert_eq!(decoded.get_field_by_name("maybe").unwrap().as_i32(), Some(0));
    assert_eq!(
        decoded
            .get_field_by_name("attrs")
            .unwrap()
            .as_map()
            .unwrap()
            .get(&MapKey::from("k")),
        Some(&Value::from("v"))
    );
    assert!(decoded.unknown_fields().is_empty());

    assert_eq!(decoded.encode_to_vec().unwrap(), bytes);
}

#[test]
fn test_unknown_fields_survive_both_ways() {
    let input = hex::decode("0805900305").unwrap();

    let ours = decode_hex(&item(), "0805900305");
    assert_eq!(ours.encode_to_vec().unwrap(), input);

    let theirs = decode_reflect("test.Item", &input);
    assert_eq!(theirs.encode_to_vec(), input);
}

#[test]
fn test_proto3_packed_and_unpacked_agree() {
    let unpacked = hex::decode("18011802").unwrap();
    let ours = DynamicMessage::decode(record(), &unpacked).unwrap();
    let theirs = decode_reflect("test3.Record", &unpacked);
    assert_eq!(ours.encode_to_vec().unwrap(), theirs.encode_to_vec());
    assert_eq!(hex::encode(theirs.encode_to_vec()), "1a020102");
}
