// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Merge and clone.
//!
//! Merging is additive: scalars in `src` overwrite `dst`, embedded messages
//! merge recursively, lists append, maps overwrite per key and unknown fields
//! append. Nothing already populated in `dst` is cleared, except oneof
//! siblings of a member `src` sets. Every value taken from `src` is deep
//! copied.

use crate::core::{CodecError, Result, Value};
use crate::reflect::DynamicMessage;

/// Merge `src` into `dst`.
///
/// Fails with [`CodecError::TypeMismatch`] when the two messages have
/// different descriptors; `dst` is left untouched in that case.
pub fn merge(dst: &mut DynamicMessage, src: &DynamicMessage) -> Result<()> {
    if dst.descriptor() != src.descriptor() {
        return Err(CodecError::type_mismatch(
            dst.descriptor().full_name(),
            src.descriptor().full_name(),
        ));
    }
    merge_fields(dst, src);
    Ok(())
}

/// Deep copy of `src`: a new empty message of the same type with `src`
/// merged into it.
pub fn clone_message(src: &DynamicMessage) -> DynamicMessage {
    let mut copy = DynamicMessage::new(src.descriptor().clone());
    merge_fields(&mut copy, src);
    copy
}

/// Merge two messages already known to share a descriptor.
pub(crate) fn merge_fields(dst: &mut DynamicMessage, src: &DynamicMessage) {
    for (field, value) in src.populated_fields() {
        let number = field.number();
        match value {
            Value::List(items) => {
                let slot = dst
                    .fields_raw_mut()
                    .entry(number)
                    .or_insert_with(|| Value::List(Vec::new()));
                if let Value::List(existing) = slot {
                    existing.extend(items.iter().cloned());
                }
            }
            Value::Map(entries) => {
                let slot = dst
                    .fields_raw_mut()
                    .entry(number)
                    .or_insert_with(|| Value::Map(Default::default()));
                if let Value::Map(existing) = slot {
                    for (key, entry) in entries {
                        existing.insert(key.clone(), entry.clone());
                    }
                }
            }
            Value::Message(embedded) => {
                if let Some(Value::Message(existing)) = dst.fields_raw_mut().get_mut(&number) {
                    merge_fields(existing, embedded);
                    continue;
                }
                dst.clear_oneof_siblings(&field);
                dst.set_field_raw(number, Value::Message(clone_message(embedded)));
            }
            scalar => {
                dst.clear_oneof_siblings(&field);
                dst.set_field_raw(number, scalar.clone());
            }
        }
    }
    dst.unknown_fields_mut().extend_from(src.unknown_fields());
}
