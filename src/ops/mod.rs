// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Structural operations over dynamic messages: merge, clone, equality and
//! required-field completeness.

pub mod equal;
pub mod init;
pub mod merge;

pub use equal::{equal, first_difference, values_equal};
pub use init::{check_initialized, is_initialized};
pub use merge::{clone_message, merge};
