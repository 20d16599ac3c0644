// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reflective message store.
//!
//! - [`DynamicMessage`] - field values of one message, addressed by descriptor
//! - [`ListMut`], [`MapMut`], [`MessageMut`] - checked mutable handles into a message
//! - [`UnknownFieldSet`] - raw frames the descriptor does not declare
//! - JSON view for diagnostics ([`DynamicMessage::to_json_value`])

mod access;
pub mod json;
mod message;
pub mod unknown;

pub use access::{ListMut, MapMut, MessageMut};
pub use message::DynamicMessage;
pub use unknown::{UnknownField, UnknownFieldSet};
