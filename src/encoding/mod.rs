// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf wire codec.
//!
//! - [`wire`] - Wire types, varints, zigzag and tags
//! - [`cursor`] - Position-tracking reader over wire data
//! - [`decoder`] - Descriptor-driven decoding into dynamic messages
//! - [`encoder`] - Encoding, including the deterministic mode
//! - [`options`] - Decode/encode options and TOML configuration
//! - [`codec`] - Façade caching descriptors by type name

pub mod codec;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod options;
pub mod wire;

pub use codec::ProtobufCodec;
pub use cursor::WireCursor;
pub use decoder::ProtobufDecoder;
pub use encoder::ProtobufEncoder;
pub use options::{CodecConfig, DecodeOptions, EncodeOptions};
pub use wire::WireType;
