// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Two-phase construction of a [`DescriptorPool`] from a `FileDescriptorSet`.
//!
//! Phase one registers every message and enum name across all files. Phase
//! two links fields, oneofs and extensions against the registered names, so
//! forward references and cycles resolve without recursion. Every
//! unresolvable reference fails the build.

use std::collections::HashMap;

use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet,
};
use tracing::debug;

use super::descriptor::{
    Cardinality, DescriptorPool, EnumInner, EnumValue, FieldInner, FileInner, KindIndex,
    MessageInner, OneofInner, PoolInner, Syntax, TypeRef,
};
use crate::core::{CodecError, Result, Value};
use crate::encoding::wire::{MAX_FIELD_NUMBER, MIN_FIELD_NUMBER, RESERVED_FIELD_NUMBERS};

impl DescriptorPool {
    /// Build a pool from serialized `FileDescriptorSet` bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let fds = FileDescriptorSet::decode(bytes)?;
        Self::from_file_descriptor_set(&fds)
    }

    /// Build a pool from a `FileDescriptorSet`.
    ///
    /// The files may appear in any order; references across files resolve as
    /// long as every referenced type is somewhere in the set.
    pub fn from_file_descriptor_set(fds: &FileDescriptorSet) -> Result<Self> {
        let mut builder = PoolBuilder::default();
        for file in &fds.file {
            builder.register_file(file)?;
        }
        builder.link()?;

        let inner = builder.inner;
        debug!(
            files = inner.files.len(),
            messages = inner.messages.len(),
            enums = inner.enums.len(),
            fields = inner.fields.len(),
            "built descriptor pool"
        );
        Ok(DescriptorPool::from_inner(inner))
    }
}

struct PendingMessage<'a> {
    index: usize,
    proto: &'a DescriptorProto,
    file: usize,
}

struct PendingExtension<'a> {
    proto: &'a FieldDescriptorProto,
    file: usize,
    /// Package or message the extension is declared in
    scope: String,
}

#[derive(Default)]
struct PoolBuilder<'a> {
    inner: PoolInner,
    messages: Vec<PendingMessage<'a>>,
    extensions: Vec<PendingExtension<'a>>,
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

impl<'a> PoolBuilder<'a> {
    // =========================================================================
    // Phase 1: register names
    // =========================================================================

    fn register_file(&mut self, file: &'a FileDescriptorProto) -> Result<()> {
        let syntax = match file.syntax() {
            "" | "proto2" => Syntax::Proto2,
            "proto3" => Syntax::Proto3,
            other => {
                return Err(CodecError::unsupported(format!(
                    "syntax '{other}' in file '{}'",
                    file.name()
                )))
            }
        };
        let file_index = self.inner.files.len();
        self.inner.files.push(FileInner {
            name: file.name().to_string(),
            package: file.package().to_string(),
            syntax,
        });

        let package = file.package();
        for message in &file.message_type {
            self.register_message(message, file_index, package)?;
        }
        for enum_type in &file.enum_type {
            self.register_enum(enum_type, file_index, package)?;
        }
        for extension in &file.extension {
            self.extensions.push(PendingExtension {
                proto: extension,
                file: file_index,
                scope: package.to_string(),
            });
        }
        Ok(())
    }

    fn register_name(&mut self, full_name: &str, type_ref: TypeRef) -> Result<()> {
        if self
            .inner
            .names
            .insert(full_name.to_string(), type_ref)
            .is_some()
        {
            return Err(CodecError::invalid_schema(
                full_name,
                "type name is defined more than once",
            ));
        }
        Ok(())
    }

    fn register_message(
        &mut self,
        proto: &'a DescriptorProto,
        file: usize,
        scope: &str,
    ) -> Result<()> {
        if proto.name().is_empty() {
            return Err(CodecError::invalid_schema(scope, "message without a name"));
        }
        let full_name = qualify(scope, proto.name());
        let index = self.inner.messages.len();
        self.register_name(&full_name, TypeRef::Message(index))?;

        let options = proto.options.as_ref();
        self.inner.messages.push(MessageInner {
            full_name: full_name.clone(),
            name: proto.name().to_string(),
            file,
            fields: Vec::new(),
            extensions: Vec::new(),
            by_number: HashMap::new(),
            by_name: HashMap::new(),
            oneofs: Vec::new(),
            is_map_entry: options.map(|o| o.map_entry()).unwrap_or(false),
            is_message_set: options.map(|o| o.message_set_wire_format()).unwrap_or(false),
        });
        self.messages.push(PendingMessage { index, proto, file });

        for nested in &proto.nested_type {
            self.register_message(nested, file, &full_name)?;
        }
        for enum_type in &proto.enum_type {
            self.register_enum(enum_type, file, &full_name)?;
        }
        for extension in &proto.extension {
            self.extensions.push(PendingExtension {
                proto: extension,
                file,
                scope: full_name.clone(),
            });
        }
        Ok(())
    }

    fn register_enum(&mut self, proto: &EnumDescriptorProto, file: usize, scope: &str) -> Result<()> {
        let full_name = qualify(scope, proto.name());
        if proto.value.is_empty() {
            return Err(CodecError::invalid_schema(
                &full_name,
                "enum must declare at least one value",
            ));
        }
        let index = self.inner.enums.len();
        self.register_name(&full_name, TypeRef::Enum(index))?;
        self.inner.enums.push(EnumInner {
            full_name,
            name: proto.name().to_string(),
            file,
            values: proto
                .value
                .iter()
                .map(|v| EnumValue {
                    name: v.name().to_string(),
                    number: v.number(),
                })
                .collect(),
        });
        Ok(())
    }

    // =========================================================================
    // Phase 2: link
    // =========================================================================

    fn link(&mut self) -> Result<()> {
        let messages = std::mem::take(&mut self.messages);
        for pending in &messages {
            self.link_message(pending)?;
        }
        for pending in &messages {
            self.check_map_entry(pending.index)?;
        }

        let extensions = std::mem::take(&mut self.extensions);
        for pending in &extensions {
            self.link_extension(pending)?;
        }
        Ok(())
    }

    /// Resolve a type reference the way protoc scopes names: fully-qualified
    /// names (leading dot) match exactly, relative names are searched from the
    /// innermost enclosing scope outwards.
    fn resolve(&self, scope: &str, name: &str) -> Option<TypeRef> {
        if let Some(absolute) = name.strip_prefix('.') {
            return self.inner.names.get(absolute).copied();
        }
        let mut scope = scope;
        loop {
            if let Some(found) = self.inner.names.get(&qualify(scope, name)) {
                return Some(*found);
            }
            if scope.is_empty() {
                return None;
            }
            scope = match scope.rfind('.') {
                Some(pos) => &scope[..pos],
                None => "",
            };
        }
    }

    fn link_message(&mut self, pending: &PendingMessage<'a>) -> Result<()> {
        let message_name = self.inner.messages[pending.index].full_name.clone();

        let oneof_base = self.inner.oneofs.len();
        for oneof in &pending.proto.oneof_decl {
            self.inner.messages[pending.index]
                .oneofs
                .push(self.inner.oneofs.len());
            self.inner.oneofs.push(OneofInner {
                name: oneof.name().to_string(),
                message: pending.index,
                fields: Vec::new(),
                is_synthetic: false,
            });
        }
        let oneof_count = pending.proto.oneof_decl.len();

        for proto in &pending.proto.field {
            let mut field = self.build_field(proto, pending.file, &message_name)?;
            field.parent = Some(pending.index);

            if let Some(oneof_index) = proto.oneof_index {
                let oneof_index = usize::try_from(oneof_index)
                    .ok()
                    .filter(|&i| i < oneof_count)
                    .ok_or_else(|| {
                        CodecError::invalid_schema(
                            &field.full_name,
                            format!("oneof index {oneof_index} out of range"),
                        )
                    })?;
                if field.cardinality == Cardinality::Repeated {
                    return Err(CodecError::invalid_schema(
                        &field.full_name,
                        "repeated field cannot be a oneof member",
                    ));
                }
                field.oneof = Some(oneof_base + oneof_index);
            }

            let field_index = self.inner.fields.len();
            let message = &mut self.inner.messages[pending.index];
            if message.by_number.insert(field.number, field_index).is_some() {
                return Err(CodecError::invalid_schema(
                    &message_name,
                    format!("field number {} is used more than once", field.number),
                ));
            }
            if message.by_name.insert(field.name.clone(), field_index).is_some() {
                return Err(CodecError::invalid_schema(
                    &message_name,
                    format!("field name '{}' is used more than once", field.name),
                ));
            }
            message.fields.push(field_index);
            if let Some(oneof) = field.oneof {
                self.inner.oneofs[oneof].fields.push(field_index);
            }
            self.inner.fields.push(field);
        }

        for oneof in oneof_base..oneof_base + oneof_count {
            let members = &self.inner.oneofs[oneof].fields;
            let synthetic = members.len() == 1
                && pending
                    .proto
                    .field
                    .iter()
                    .any(|f| f.oneof_index == Some((oneof - oneof_base) as i32) && f.proto3_optional());
            self.inner.oneofs[oneof].is_synthetic = synthetic;
        }

        let fields = &self.inner.fields;
        self.inner.messages[pending.index]
            .fields
            .sort_by_key(|&i| fields[i].number);
        Ok(())
    }

    fn check_map_entry(&self, index: usize) -> Result<()> {
        let message = &self.inner.messages[index];
        if !message.is_map_entry {
            return Ok(());
        }
        let key = message.by_number.get(&1).map(|&i| &self.inner.fields[i]);
        let value = message.by_number.get(&2).map(|&i| &self.inner.fields[i]);
        let (Some(key), Some(_)) = (key, value) else {
            return Err(CodecError::invalid_schema(
                &message.full_name,
                "map entry must declare key = 1 and value = 2",
            ));
        };
        if message.fields.len() != 2 {
            return Err(CodecError::invalid_schema(
                &message.full_name,
                "map entry must declare exactly two fields",
            ));
        }
        let valid_key = !matches!(
            key.kind,
            KindIndex::Double
                | KindIndex::Float
                | KindIndex::Bytes
                | KindIndex::Message(_)
                | KindIndex::Enum(_)
        );
        if !valid_key {
            return Err(CodecError::invalid_schema(
                &message.full_name,
                "map key must be an integral, bool or string type",
            ));
        }
        Ok(())
    }

    fn link_extension(&mut self, pending: &PendingExtension<'a>) -> Result<()> {
        let proto = pending.proto;
        let mut field = self.build_field(proto, pending.file, &pending.scope)?;

        let extendee_name = proto.extendee();
        let extendee = match self.resolve(&pending.scope, extendee_name) {
            Some(TypeRef::Message(index)) => index,
            _ => {
                return Err(CodecError::invalid_schema(
                    &field.full_name,
                    format!("unresolvable extendee '{extendee_name}'"),
                ))
            }
        };
        field.extendee = Some(extendee);
        field.parent = match self.inner.names.get(&pending.scope) {
            Some(TypeRef::Message(index)) => Some(*index),
            _ => None,
        };
        if field.cardinality == Cardinality::Required {
            return Err(CodecError::invalid_schema(
                &field.full_name,
                "extension fields cannot be required",
            ));
        }

        let field_index = self.inner.fields.len();
        let target = &mut self.inner.messages[extendee];
        if target.by_number.insert(field.number, field_index).is_some() {
            return Err(CodecError::invalid_schema(
                &target.full_name,
                format!(
                    "extension '{}' conflicts with field number {}",
                    field.full_name, field.number
                ),
            ));
        }
        target.by_name.insert(field.full_name.clone(), field_index);
        target.extensions.push(field_index);
        self.inner.fields.push(field);

        let fields = &self.inner.fields;
        self.inner.messages[extendee]
            .extensions
            .sort_by_key(|&i| fields[i].number);
        Ok(())
    }

    fn build_field(
        &self,
        proto: &FieldDescriptorProto,
        file: usize,
        scope: &str,
    ) -> Result<FieldInner> {
        if proto.name().is_empty() {
            return Err(CodecError::invalid_schema(scope, "field without a name"));
        }
        let full_name = qualify(scope, proto.name());

        let number = proto
            .number
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| (MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(n))
            .ok_or_else(|| {
                CodecError::invalid_schema(
                    &full_name,
                    format!("invalid field number {:?}", proto.number),
                )
            })?;
        if RESERVED_FIELD_NUMBERS.contains(&number) {
            return Err(CodecError::invalid_schema(
                &full_name,
                format!("field number {number} is reserved for the protobuf implementation"),
            ));
        }

        let syntax = self.inner.files[file].syntax;
        let label = match proto.label {
            None => Label::Optional,
            Some(raw) => Label::try_from(raw).map_err(|_| {
                CodecError::invalid_schema(&full_name, format!("unknown label {raw}"))
            })?,
        };
        let cardinality = match label {
            Label::Optional => Cardinality::Optional,
            Label::Required => Cardinality::Required,
            Label::Repeated => Cardinality::Repeated,
        };
        if cardinality == Cardinality::Required && syntax == Syntax::Proto3 {
            return Err(CodecError::invalid_schema(
                &full_name,
                "required fields are not allowed in proto3",
            ));
        }

        let (kind, is_group) = self.resolve_kind(proto, scope, &full_name)?;

        let is_packable = !matches!(
            kind,
            KindIndex::String | KindIndex::Bytes | KindIndex::Message(_)
        );
        let packed_option = proto.options.as_ref().and_then(|o| o.packed);
        let is_packed = cardinality == Cardinality::Repeated
            && is_packable
            && packed_option.unwrap_or(syntax == Syntax::Proto3);

        let supports_presence = cardinality != Cardinality::Repeated
            && (syntax == Syntax::Proto2
                || matches!(kind, KindIndex::Message(_))
                || proto.oneof_index.is_some()
                || proto.proto3_optional()
                || proto.extendee.is_some());

        let default = match &proto.default_value {
            Some(text) => {
                if cardinality == Cardinality::Repeated {
                    return Err(CodecError::invalid_schema(
                        &full_name,
                        "repeated fields cannot declare a default",
                    ));
                }
                Some(self.parse_default(text, kind, &full_name)?)
            }
            None => None,
        };

        Ok(FieldInner {
            name: proto.name().to_string(),
            json_name: proto
                .json_name
                .clone()
                .unwrap_or_else(|| to_json_name(proto.name())),
            full_name,
            number,
            kind,
            cardinality,
            is_group,
            is_packed,
            supports_presence,
            parent: None,
            extendee: None,
            oneof: None,
            default,
            file,
        })
    }

    fn resolve_kind(
        &self,
        proto: &FieldDescriptorProto,
        scope: &str,
        full_name: &str,
    ) -> Result<(KindIndex, bool)> {
        let referenced = || -> Result<TypeRef> {
            let type_name = proto.type_name();
            self.resolve(scope, type_name).ok_or_else(|| {
                CodecError::invalid_schema(
                    full_name,
                    format!("unresolvable type reference '{type_name}'"),
                )
            })
        };

        let Some(raw) = proto.r#type else {
            // Unlinked descriptors may carry only a type name.
            return match referenced()? {
                TypeRef::Message(index) => Ok((KindIndex::Message(index), false)),
                TypeRef::Enum(index) => Ok((KindIndex::Enum(index), false)),
            };
        };
        let ty = Type::try_from(raw)
            .map_err(|_| CodecError::invalid_schema(full_name, format!("unknown type {raw}")))?;

        let kind = match ty {
            Type::Double => KindIndex::Double,
            Type::Float => KindIndex::Float,
            Type::Int64 => KindIndex::Int64,
            Type::Uint64 => KindIndex::Uint64,
            Type::Int32 => KindIndex::Int32,
            Type::Fixed64 => KindIndex::Fixed64,
            Type::Fixed32 => KindIndex::Fixed32,
            Type::Bool => KindIndex::Bool,
            Type::String => KindIndex::String,
            Type::Bytes => KindIndex::Bytes,
            Type::Uint32 => KindIndex::Uint32,
            Type::Sfixed32 => KindIndex::Sfixed32,
            Type::Sfixed64 => KindIndex::Sfixed64,
            Type::Sint32 => KindIndex::Sint32,
            Type::Sint64 => KindIndex::Sint64,
            Type::Message | Type::Group => match referenced()? {
                TypeRef::Message(index) => KindIndex::Message(index),
                TypeRef::Enum(_) => {
                    return Err(CodecError::invalid_schema(
                        full_name,
                        format!("'{}' is an enum, expected a message", proto.type_name()),
                    ))
                }
            },
            Type::Enum => match referenced()? {
                TypeRef::Enum(index) => KindIndex::Enum(index),
                TypeRef::Message(_) => {
                    return Err(CodecError::invalid_schema(
                        full_name,
                        format!("'{}' is a message, expected an enum", proto.type_name()),
                    ))
                }
            },
        };
        Ok((kind, ty == Type::Group))
    }

    fn parse_default(&self, text: &str, kind: KindIndex, full_name: &str) -> Result<Value> {
        let invalid = || {
            CodecError::invalid_schema(full_name, format!("invalid default value '{text}'"))
        };
        let value = match kind {
            KindIndex::Double => Value::F64(parse_float(text).ok_or_else(invalid)?),
            KindIndex::Float => Value::F32(parse_float(text).ok_or_else(invalid)? as f32),
            KindIndex::Int32 | KindIndex::Sint32 | KindIndex::Sfixed32 => {
                Value::I32(text.parse().map_err(|_| invalid())?)
            }
            KindIndex::Int64 | KindIndex::Sint64 | KindIndex::Sfixed64 => {
                Value::I64(text.parse().map_err(|_| invalid())?)
            }
            KindIndex::Uint32 | KindIndex::Fixed32 => {
                Value::U32(text.parse().map_err(|_| invalid())?)
            }
            KindIndex::Uint64 | KindIndex::Fixed64 => {
                Value::U64(text.parse().map_err(|_| invalid())?)
            }
            KindIndex::Bool => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(invalid()),
            },
            KindIndex::String => Value::String(text.to_string()),
            KindIndex::Bytes => Value::Bytes(unescape_bytes(text).ok_or_else(invalid)?),
            KindIndex::Enum(index) => {
                let number = self.inner.enums[index]
                    .values
                    .iter()
                    .find(|v| v.name == text)
                    .map(|v| v.number)
                    .ok_or_else(invalid)?;
                Value::EnumNumber(number)
            }
            KindIndex::Message(_) => {
                return Err(CodecError::invalid_schema(
                    full_name,
                    "message fields cannot declare a default",
                ))
            }
        };
        Ok(value)
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => text.parse().ok(),
    }
}

/// Undo the C-style escaping protoc applies to `bytes` defaults.
fn unescape_bytes(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        i += 1;
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let escape = *bytes.get(i)?;
        i += 1;
        match escape {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            b'\\' | b'\'' | b'"' | b'?' => out.push(escape),
            b'0'..=b'7' => {
                let mut value = u32::from(escape - b'0');
                for _ in 0..2 {
                    match bytes.get(i) {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            i += 1;
                        }
                        _ => break,
                    }
                }
                out.push(u8::try_from(value).ok()?);
            }
            b'x' | b'X' => {
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 2 {
                    match bytes.get(i).and_then(|d| (*d as char).to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            i += 1;
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    return None;
                }
                out.push(value as u8);
            }
            _ => return None,
        }
    }
    Some(out)
}

/// protoc's default JSON name: drop underscores, capitalizing the next letter.
fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
