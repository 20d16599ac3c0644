// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf schema descriptors.
//!
//! A [`DescriptorPool`] is built from a `FileDescriptorSet` and holds every
//! message, field, enum and oneof of the schema. The other handle types in
//! this module point into a pool and are what the codec and the reflective
//! message store are driven by.

mod builder;
pub mod descriptor;

pub use descriptor::{
    Cardinality, DescriptorPool, EnumDescriptor, EnumValue, FieldDescriptor, Kind,
    MessageDescriptor, OneofDescriptor, Syntax,
};
