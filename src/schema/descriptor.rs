// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Descriptor model for protobuf message schemas.
//!
//! All descriptors of a schema live in one immutable arena, the
//! [`DescriptorPool`]. Message, field, enum and oneof descriptors are handles
//! made of a pool reference plus an index into the arena, so cyclic and
//! self-referential message types need no ownership cycles. Handles are cheap
//! to clone and safe to share across threads.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::core::Value;
use crate::encoding::wire::WireType;
use crate::reflect::DynamicMessage;

/// Schema syntax of the file a descriptor was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// `syntax = "proto2"` (also the default when unspecified)
    Proto2,
    /// `syntax = "proto3"`
    Proto3,
}

impl Syntax {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
        }
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Singular field
    Optional,
    /// Singular proto2 field that must be populated
    Required,
    /// List or map field
    Repeated,
}

/// Semantic type of a field (or of a list element).
#[derive(Clone, PartialEq, Eq)]
pub enum Kind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    /// Embedded message or group
    Message(MessageDescriptor),
    /// Enum
    Enum(EnumDescriptor),
}

impl Kind {
    /// Wire type used for a single, unpacked value of this kind.
    pub fn wire_type(&self) -> WireType {
        match self {
            Kind::Double | Kind::Fixed64 | Kind::Sfixed64 => WireType::SixtyFourBit,
            Kind::Float | Kind::Fixed32 | Kind::Sfixed32 => WireType::ThirtyTwoBit,
            Kind::Int64
            | Kind::Uint64
            | Kind::Int32
            | Kind::Bool
            | Kind::Uint32
            | Kind::Sint32
            | Kind::Sint64
            | Kind::Enum(_) => WireType::Varint,
            Kind::String | Kind::Bytes | Kind::Message(_) => WireType::LengthDelimited,
        }
    }

    /// Scalar numeric kinds (and enums) may use packed encoding.
    pub fn is_packable(&self) -> bool {
        !matches!(self, Kind::String | Kind::Bytes | Kind::Message(_))
    }

    /// Kinds allowed as map keys.
    pub fn is_valid_map_key(&self) -> bool {
        !matches!(
            self,
            Kind::Double | Kind::Float | Kind::Bytes | Kind::Message(_) | Kind::Enum(_)
        )
    }

    /// Protobuf type name as written in a `.proto` file.
    pub fn type_name(&self) -> String {
        match self {
            Kind::Double => "double".to_string(),
            Kind::Float => "float".to_string(),
            Kind::Int64 => "int64".to_string(),
            Kind::Uint64 => "uint64".to_string(),
            Kind::Int32 => "int32".to_string(),
            Kind::Fixed64 => "fixed64".to_string(),
            Kind::Fixed32 => "fixed32".to_string(),
            Kind::Bool => "bool".to_string(),
            Kind::String => "string".to_string(),
            Kind::Bytes => "bytes".to_string(),
            Kind::Uint32 => "uint32".to_string(),
            Kind::Sfixed32 => "sfixed32".to_string(),
            Kind::Sfixed64 => "sfixed64".to_string(),
            Kind::Sint32 => "sint32".to_string(),
            Kind::Sint64 => "sint64".to_string(),
            Kind::Message(m) => m.full_name().to_string(),
            Kind::Enum(e) => e.full_name().to_string(),
        }
    }

    /// Message descriptor for message kinds.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Enum descriptor for enum kinds.
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Kind with arena indices in place of descriptor handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindIndex {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Message(usize),
    Enum(usize),
}

#[derive(Debug)]
pub(crate) struct FileInner {
    pub(crate) name: String,
    pub(crate) package: String,
    pub(crate) syntax: Syntax,
}

#[derive(Debug)]
pub(crate) struct MessageInner {
    pub(crate) full_name: String,
    pub(crate) name: String,
    pub(crate) file: usize,
    /// Regular fields ordered by number
    pub(crate) fields: Vec<usize>,
    /// Extensions targeting this message, ordered by number
    pub(crate) extensions: Vec<usize>,
    pub(crate) by_number: HashMap<u32, usize>,
    pub(crate) by_name: HashMap<String, usize>,
    pub(crate) oneofs: Vec<usize>,
    pub(crate) is_map_entry: bool,
    pub(crate) is_message_set: bool,
}

#[derive(Debug)]
pub(crate) struct FieldInner {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) json_name: String,
    pub(crate) number: u32,
    pub(crate) kind: KindIndex,
    pub(crate) cardinality: Cardinality,
    pub(crate) is_group: bool,
    pub(crate) is_packed: bool,
    pub(crate) supports_presence: bool,
    /// Message the field is declared in (for extensions, the scope or none)
    pub(crate) parent: Option<usize>,
    /// For extensions, the message being extended
    pub(crate) extendee: Option<usize>,
    pub(crate) oneof: Option<usize>,
    pub(crate) default: Option<Value>,
    pub(crate) file: usize,
}

#[derive(Debug)]
pub(crate) struct EnumInner {
    pub(crate) full_name: String,
    pub(crate) name: String,
    pub(crate) file: usize,
    pub(crate) values: Vec<EnumValue>,
}

#[derive(Debug)]
pub(crate) struct OneofInner {
    pub(crate) name: String,
    pub(crate) message: usize,
    pub(crate) fields: Vec<usize>,
    pub(crate) is_synthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeRef {
    Message(usize),
    Enum(usize),
}

#[derive(Debug, Default)]
pub(crate) struct PoolInner {
    pub(crate) files: Vec<FileInner>,
    pub(crate) messages: Vec<MessageInner>,
    pub(crate) fields: Vec<FieldInner>,
    pub(crate) enums: Vec<EnumInner>,
    pub(crate) oneofs: Vec<OneofInner>,
    /// Fully-qualified type names without a leading dot
    pub(crate) names: HashMap<String, TypeRef>,
}

/// Immutable arena holding every descriptor of a schema.
///
/// Built once from a `FileDescriptorSet` (see [`DescriptorPool::decode`]) and
/// shared read-only afterwards. Cloning is a reference-count increment.
#[derive(Clone)]
pub struct DescriptorPool {
    pub(crate) inner: Arc<PoolInner>,
}

impl DescriptorPool {
    pub(crate) fn from_inner(inner: PoolInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Look up a message type by fully-qualified name (leading dot optional).
    pub fn get_message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        match self.inner.names.get(name.trim_start_matches('.'))? {
            TypeRef::Message(index) => Some(MessageDescriptor {
                pool: self.clone(),
                index: *index,
            }),
            TypeRef::Enum(_) => None,
        }
    }

    /// Look up an enum type by fully-qualified name (leading dot optional).
    pub fn get_enum_by_name(&self, name: &str) -> Option<EnumDescriptor> {
        match self.inner.names.get(name.trim_start_matches('.'))? {
            TypeRef::Enum(index) => Some(EnumDescriptor {
                pool: self.clone(),
                index: *index,
            }),
            TypeRef::Message(_) => None,
        }
    }

    /// All message types in declaration order (nested types follow their parent).
    pub fn all_messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(move |index| MessageDescriptor {
            pool: self.clone(),
            index,
        })
    }

    /// All enum types in declaration order.
    pub fn all_enums(&self) -> impl Iterator<Item = EnumDescriptor> + '_ {
        (0..self.inner.enums.len()).map(move |index| EnumDescriptor {
            pool: self.clone(),
            index,
        })
    }

    /// Names of the files this pool was built from.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.inner.files.iter().map(|f| f.name.as_str())
    }

    pub(crate) fn field(&self, index: usize) -> FieldDescriptor {
        FieldDescriptor {
            pool: self.clone(),
            index,
        }
    }

    pub(crate) fn message(&self, index: usize) -> MessageDescriptor {
        MessageDescriptor {
            pool: self.clone(),
            index,
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("files", &self.inner.files.len())
            .field("messages", &self.inner.messages.len())
            .field("enums", &self.inner.enums.len())
            .finish()
    }
}

// =============================================================================
// Message descriptor
// =============================================================================

/// Handle to a message type in a [`DescriptorPool`].
///
/// Two handles are equal only if they point at the same type in the same pool:
/// identically named types from separately built pools are distinct.
#[derive(Clone)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl MessageDescriptor {
    fn inner(&self) -> &MessageInner {
        &self.pool.inner.messages[self.index]
    }

    /// The pool this descriptor belongs to.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Fully-qualified name, e.g. `pkg.Outer.Inner`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Short name, e.g. `Inner`.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Package of the declaring file.
    pub fn package(&self) -> &str {
        &self.pool.inner.files[self.inner().file].package
    }

    /// Name of the declaring file.
    pub fn file_name(&self) -> &str {
        &self.pool.inner.files[self.inner().file].name
    }

    /// Syntax of the declaring file.
    pub fn syntax(&self) -> Syntax {
        self.pool.inner.files[self.inner().file].syntax
    }

    /// Regular (non-extension) fields in ascending number order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner().fields.iter().map(|&i| self.pool.field(i))
    }

    /// Extension fields targeting this message, in ascending number order.
    pub fn extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner().extensions.iter().map(|&i| self.pool.field(i))
    }

    /// Look up a field or extension by number.
    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        self.inner()
            .by_number
            .get(&number)
            .map(|&i| self.pool.field(i))
    }

    /// Look up a field by name, or an extension by its fully-qualified name.
    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .by_name
            .get(name.trim_start_matches('.'))
            .map(|&i| self.pool.field(i))
    }

    /// Oneofs declared in this message, including synthetic proto3 `optional` ones.
    pub fn oneofs(&self) -> impl ExactSizeIterator<Item = OneofDescriptor> + '_ {
        self.inner().oneofs.iter().map(|&index| OneofDescriptor {
            pool: self.pool.clone(),
            index,
        })
    }

    /// Fields declared `required`, in ascending number order.
    pub fn required_fields(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
        self.fields().filter(|f| f.is_required())
    }

    /// True for the synthesized entry type of a map field.
    pub fn is_map_entry(&self) -> bool {
        self.inner().is_map_entry
    }

    /// True if the message uses the legacy MessageSet wire format.
    pub fn is_message_set(&self) -> bool {
        self.inner().is_message_set
    }

    /// Key field of a map entry type.
    pub fn map_entry_key_field(&self) -> Option<FieldDescriptor> {
        if self.is_map_entry() {
            self.get_field(1)
        } else {
            None
        }
    }

    /// Value field of a map entry type.
    pub fn map_entry_value_field(&self) -> Option<FieldDescriptor> {
        if self.is_map_entry() {
            self.get_field(2)
        } else {
            None
        }
    }

    /// Create an empty message of this type.
    pub fn new_message(&self) -> DynamicMessage {
        DynamicMessage::new(self.clone())
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.pool.ptr_eq(&other.pool)
    }
}

impl Eq for MessageDescriptor {}

impl Hash for MessageDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.pool.inner) as usize).hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageDescriptor({})", self.full_name())
    }
}

// =============================================================================
// Field descriptor
// =============================================================================

/// Handle to a field or extension in a [`DescriptorPool`].
#[derive(Clone)]
pub struct FieldDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl FieldDescriptor {
    fn inner(&self) -> &FieldInner {
        &self.pool.inner.fields[self.index]
    }

    /// Field name as declared.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Fully-qualified name, e.g. `pkg.Msg.field`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// JSON name (lowerCamelCase unless overridden).
    pub fn json_name(&self) -> &str {
        &self.inner().json_name
    }

    /// Field number.
    pub fn number(&self) -> u32 {
        self.inner().number
    }

    /// Semantic type of the field, or of its elements for lists.
    ///
    /// For map fields this is the synthesized entry message.
    pub fn kind(&self) -> Kind {
        let pool = &self.pool;
        match self.inner().kind {
            KindIndex::Double => Kind::Double,
            KindIndex::Float => Kind::Float,
            KindIndex::Int64 => Kind::Int64,
            KindIndex::Uint64 => Kind::Uint64,
            KindIndex::Int32 => Kind::Int32,
            KindIndex::Fixed64 => Kind::Fixed64,
            KindIndex::Fixed32 => Kind::Fixed32,
            KindIndex::Bool => Kind::Bool,
            KindIndex::String => Kind::String,
            KindIndex::Bytes => Kind::Bytes,
            KindIndex::Uint32 => Kind::Uint32,
            KindIndex::Sfixed32 => Kind::Sfixed32,
            KindIndex::Sfixed64 => Kind::Sfixed64,
            KindIndex::Sint32 => Kind::Sint32,
            KindIndex::Sint64 => Kind::Sint64,
            KindIndex::Message(index) => Kind::Message(pool.message(index)),
            KindIndex::Enum(index) => Kind::Enum(EnumDescriptor {
                pool: pool.clone(),
                index,
            }),
        }
    }

    /// Field cardinality.
    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    /// True for `required` fields.
    pub fn is_required(&self) -> bool {
        self.cardinality() == Cardinality::Required
    }

    /// True for map fields.
    pub fn is_map(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
            && match self.inner().kind {
                KindIndex::Message(index) => self.pool.inner.messages[index].is_map_entry,
                _ => false,
            }
    }

    /// True for repeated fields that are not maps.
    pub fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated && !self.is_map()
    }

    /// True if the field uses the group wire encoding.
    pub fn is_group(&self) -> bool {
        self.inner().is_group
    }

    /// True if a repeated field is encoded packed.
    pub fn is_packed(&self) -> bool {
        self.inner().is_packed
    }

    /// True if the field tracks explicit presence (has-bit semantics).
    pub fn supports_presence(&self) -> bool {
        self.inner().supports_presence
    }

    /// True for extension fields.
    pub fn is_extension(&self) -> bool {
        self.inner().extendee.is_some()
    }

    /// Message this field belongs to: the declaring message, or the extendee
    /// for extensions.
    pub fn containing_message(&self) -> MessageDescriptor {
        let inner = self.inner();
        let index = inner.extendee.or(inner.parent).unwrap_or_default();
        self.pool.message(index)
    }

    /// Oneof this field is a member of.
    pub fn containing_oneof(&self) -> Option<OneofDescriptor> {
        self.inner().oneof.map(|index| OneofDescriptor {
            pool: self.pool.clone(),
            index,
        })
    }

    /// Wire type of a single, unpacked value of this field.
    pub fn wire_type(&self) -> WireType {
        if self.is_group() {
            WireType::StartGroup
        } else {
            self.kind().wire_type()
        }
    }

    /// Default value of a singular field: the declared default if any,
    /// otherwise the zero value of the kind.
    pub fn default_value(&self) -> Value {
        match &self.inner().default {
            Some(value) => value.clone(),
            None => Value::default_for_kind(&self.kind()),
        }
    }

    /// Declared `[default = ...]` value, if any.
    pub fn declared_default(&self) -> Option<&Value> {
        self.inner().default.as_ref()
    }

    /// Key field of a map field's entry type.
    pub fn map_key_field(&self) -> Option<FieldDescriptor> {
        match self.kind() {
            Kind::Message(entry) if self.is_map() => entry.map_entry_key_field(),
            _ => None,
        }
    }

    /// Value field of a map field's entry type.
    pub fn map_value_field(&self) -> Option<FieldDescriptor> {
        match self.kind() {
            Kind::Message(entry) if self.is_map() => entry.map_entry_value_field(),
            _ => None,
        }
    }

    /// Syntax of the declaring file.
    pub fn syntax(&self) -> Syntax {
        self.pool.inner.files[self.inner().file].syntax
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.pool.ptr_eq(&other.pool)
    }
}

impl Eq for FieldDescriptor {}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldDescriptor({} = {})", self.full_name(), self.number())
    }
}

// =============================================================================
// Enum descriptor
// =============================================================================

/// A named enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Value name
    pub name: String,
    /// Value number
    pub number: i32,
}

/// Handle to an enum type in a [`DescriptorPool`].
#[derive(Clone)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl EnumDescriptor {
    fn inner(&self) -> &EnumInner {
        &self.pool.inner.enums[self.index]
    }

    /// Fully-qualified name.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Short name.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Declared values in declaration order.
    pub fn values(&self) -> &[EnumValue] {
        &self.inner().values
    }

    /// Name of the first value declared with `number`.
    pub fn get_value(&self, number: i32) -> Option<&str> {
        self.values()
            .iter()
            .find(|v| v.number == number)
            .map(|v| v.name.as_str())
    }

    /// Number of the value called `name`.
    pub fn get_value_by_name(&self, name: &str) -> Option<i32> {
        self.values()
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.number)
    }

    /// Default number: the first declared value.
    pub fn default_number(&self) -> i32 {
        self.values().first().map(|v| v.number).unwrap_or(0)
    }

    /// Closed enums (proto2) reject undeclared numbers; open enums (proto3) keep them.
    pub fn is_closed(&self) -> bool {
        self.pool.inner.files[self.inner().file].syntax == Syntax::Proto2
    }
}

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.pool.ptr_eq(&other.pool)
    }
}

impl Eq for EnumDescriptor {}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumDescriptor({})", self.full_name())
    }
}

// =============================================================================
// Oneof descriptor
// =============================================================================

/// Handle to a oneof in a [`DescriptorPool`].
#[derive(Clone)]
pub struct OneofDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl OneofDescriptor {
    fn inner(&self) -> &OneofInner {
        &self.pool.inner.oneofs[self.index]
    }

    /// Oneof name.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Member fields.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner().fields.iter().map(|&i| self.pool.field(i))
    }

    /// Message declaring the oneof.
    pub fn containing_message(&self) -> MessageDescriptor {
        self.pool.message(self.inner().message)
    }

    /// True for the single-member oneof synthesized for a proto3 `optional` field.
    pub fn is_synthetic(&self) -> bool {
        self.inner().is_synthetic
    }
}

impl PartialEq for OneofDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.pool.ptr_eq(&other.pool)
    }
}

impl Eq for OneofDescriptor {}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OneofDescriptor({})", self.name())
    }
}
