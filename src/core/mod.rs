// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout protocodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error handling for schema, decode, encode and structural operations
//! - [`Value`] / [`MapKey`] - Closed field value representation
//! - [`TypeRegistry`] - Thread-safe name registry

pub mod error;
pub mod registry;
pub mod value;

pub use error::{CodecError, Result};
pub use registry::TypeRegistry;
pub use value::{MapKey, Value};
