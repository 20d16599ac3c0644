// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod compare;
mod decode;
mod encode;
mod schema;

pub use compare::CompareCmd;
pub use decode::DecodeCmd;
pub use encode::EncodeCmd;
pub use schema::SchemaCmd;
