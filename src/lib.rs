// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protocodec
//!
//! Protocol buffer wire codec and reflective message model.
//!
//! Messages are handled without generated code: a schema is loaded at
//! runtime from a `FileDescriptorSet`, and messages of any type in it are held
//! in a [`DynamicMessage`] addressed through descriptors.
//!
//! ## Architecture
//!
//! - `schema/` - Descriptor pool built from a `FileDescriptorSet`
//! - `encoding/` - Wire format decoder/encoder and the codec façade
//! - `reflect/` - Dynamic message store and unknown-field preservation
//! - `ops/` - Merge, clone, equality and required-field checks
//! - `legacy` - Capability-probing API for types with their own codec
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protocodec::{ops, DescriptorPool, DynamicMessage, Value};
//!
//! # let fds_bytes = vec![0u8; 0];
//! let pool = DescriptorPool::decode(&fds_bytes)?;
//! let descriptor = pool.get_message_by_name("pkg.Item").unwrap();
//!
//! let mut item = DynamicMessage::decode(descriptor, &[0x08, 0x05])?;
//! item.set_field_by_name("name", Value::from("abc"))?;
//! ops::check_initialized(&item)?;
//!
//! let bytes = item.encode_deterministic()?;
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CodecError, MapKey, Result, Value};

// Schema descriptors
pub mod schema;

pub use schema::{DescriptorPool, FieldDescriptor, Kind, MessageDescriptor};

// Encoding/decoding
pub mod encoding;

pub use encoding::{CodecConfig, DecodeOptions, EncodeOptions, ProtobufCodec};

// Reflective message store
pub mod reflect;

pub use reflect::{DynamicMessage, ListMut, MapMut, MessageMut, UnknownFieldSet};

// Structural operations
pub mod ops;

// Compatibility surface
pub mod legacy;
