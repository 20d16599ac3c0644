// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Property tests over generated `test.Item` messages.

mod common;

use std::collections::HashMap;

use proptest::prelude::*;

use common::{child_message, item};
use protocodec::{ops, DynamicMessage, MapKey, Value};

#[derive(Debug, Clone)]
enum Choice {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone)]
struct ItemShape {
    id: i32,
    name: Option<String>,
    child: Option<(i32, Option<String>)>,
    values: Vec<i32>,
    counts: Vec<(String, i32)>,
    choice: Option<Choice>,
    color: Option<i32>,
    blob: Option<Vec<u8>>,
    delta: Option<i64>,
    ratio: Option<f64>,
    tags: Vec<String>,
    priority: Option<i32>,
}

fn choice() -> impl Strategy<Value = Choice> {
    prop_oneof![
        any::<String>().prop_map(Choice::Text),
        any::<i64>().prop_map(Choice::Number),
    ]
}

fn item_shape() -> impl Strategy<Value = ItemShape> {
    let head = (
        any::<i32>(),
        proptest::option::of(any::<String>()),
        proptest::option::of((any::<i32>(), proptest::option::of("[a-z]{0,8}"))),
        prop::collection::vec(any::<i32>(), 0..8),
        prop::collection::vec(("[a-z]{0,4}", any::<i32>()), 0..4),
        proptest::option::of(choice()),
    );
    let tail = (
        proptest::option::of(0..3i32),
        proptest::option::of(prop::collection::vec(any::<u8>(), 0..16)),
        proptest::option::of(any::<i64>()),
        proptest::option::of(-1.0e9..1.0e9f64),
        prop::collection::vec(".{0,6}", 0..4),
        proptest::option::of(any::<i32>()),
    );
    (head, tail).prop_map(
        |((id, name, child, values, counts, choice), (color, blob, delta, ratio, tags, priority))| {
            ItemShape {
                id,
                name,
                child,
                values,
                counts,
                choice,
                color,
                blob,
                delta,
                ratio,
                tags,
                priority,
            }
        },
    )
}

fn build(shape: &ItemShape) -> DynamicMessage {
    let descriptor = item();
    let mut message = descriptor.new_message();
    let mut set = |name: &str, value: Value| {
        message
            .set_field_by_name(name, value)
            .unwrap_or_else(|e| panic!("set {name}: {e}"));
    };

    set("id", Value::I32(shape.id));
    if let Some(name) = &shape.name {
        set("name", Value::from(name.as_str()));
    }
    if let Some((id, label)) = &shape.child {
        set("child", Value::Message(child_message(*id, label.as_deref())));
    }
    set(
        "values",
        Value::List(shape.values.iter().map(|v| Value::I32(*v)).collect()),
    );
    set(
        "counts",
        Value::Map(
            shape.counts
                .iter()
                .map(|(k, v)| (MapKey::from(k.as_str()), Value::I32(*v)))
                .collect::<HashMap<_, _>>(),
        ),
    );
    match &shape.choice {
        Some(Choice::Text(text)) => set("text", Value::from(text.as_str())),
        Some(Choice::Number(number)) => set("number", Value::I64(*number)),
        None => {}
    }
    if let Some(color) = shape.color {
        set("color", Value::EnumNumber(color));
    }
    if let Some(blob) = &shape.blob {
        set("blob", Value::Bytes(blob.clone()));
    }
    if let Some(delta) = shape.delta {
        set("delta", Value::I64(delta));
    }
    if let Some(ratio) = shape.ratio {
        set("ratio", Value::F64(ratio));
    }
    set(
        "tags",
        Value::List(shape.tags.iter().map(|t| Value::from(t.as_str())).collect()),
    );
    if let Some(priority) = shape.priority {
        set("test.priority", Value::I32(priority));
    }
    message
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(shape in item_shape()) {
        let message = build(&shape);
        let bytes = message.encode_deterministic().unwrap();
        prop_assert_eq!(message.encoded_len(), bytes.len());

        let decoded = DynamicMessage::decode(item(), &bytes).unwrap();
        prop_assert_eq!(ops::first_difference(&message, &decoded), None);
        prop_assert_eq!(decoded.encode_deterministic().unwrap(), bytes);
    }

    #[test]
    fn prop_merge_matches_concatenated_decode(a in item_shape(), b in item_shape()) {
        let a = build(&a);
        let b = build(&b);

        let mut merged = a.clone();
        ops::merge(&mut merged, &b).unwrap();

        let mut bytes = a.encode_to_vec().unwrap();
        bytes.extend(b.encode_to_vec().unwrap());
        let decoded = DynamicMessage::decode(item(), &bytes).unwrap();

        prop_assert_eq!(ops::first_difference(&merged, &decoded), None);
    }

    #[test]
    fn prop_merge_is_associative(a in item_shape(), b in item_shape(), c in item_shape()) {
        let (a, b, c) = (build(&a), build(&b), build(&c));

        let mut left = a.clone();
        ops::merge(&mut left, &b).unwrap();
        ops::merge(&mut left, &c).unwrap();

        let mut tail = b.clone();
        ops::merge(&mut tail, &c).unwrap();
        let mut right = a.clone();
        ops::merge(&mut right, &tail).unwrap();

        prop_assert_eq!(ops::first_difference(&left, &right), None);
    }

    #[test]
    fn prop_equal_is_reflexive_and_symmetric(a in item_shape(), b in item_shape()) {
        let (a, b) = (build(&a), build(&b));
        prop_assert!(ops::equal(&a, &a));
        prop_assert_eq!(ops::equal(&a, &b), ops::equal(&b, &a));
        prop_assert_eq!(ops::equal(&a, &b), ops::first_difference(&a, &b).is_none());
    }

    #[test]
    fn prop_clone_equals_original(shape in item_shape()) {
        let message = build(&shape);
        let mut copy = ops::clone_message(&message);
        prop_assert!(ops::equal(&message, &copy));
        prop_assert_eq!(ops::is_initialized(&copy).is_ok(), ops::is_initialized(&message).is_ok());

        copy.set_field_by_name("id", Value::I32(shape.id.wrapping_add(1))).unwrap();
        copy.set_field_by_name("tags", Value::List(vec![Value::from("changed")])).unwrap();
        prop_assert_eq!(message.get_field_by_name("id").unwrap().as_i32(), Some(shape.id));
        let first_diff = ops::first_difference(&message, &copy);
        prop_assert_eq!(first_diff.as_deref(), Some("id"));
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        // Errors are fine; a decoded message must re-encode.
        if let Ok(message) = DynamicMessage::decode(item(), &bytes) {
            let encoded = protocodec::encoding::ProtobufEncoder::with_options(
                protocodec::EncodeOptions::default().with_allow_partial(true),
            )
            .encode(&message);
            prop_assert!(encoded.is_ok());
        }
    }
}
