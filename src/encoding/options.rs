// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode and encode options.
//!
//! Options can be set in code or loaded from a TOML file:
//!
//! ```toml
//! [decode]
//! strict_utf8 = false
//! recursion_limit = 64
//!
//! [encode]
//! deterministic = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{CodecError, Result};

/// Default nesting depth accepted while decoding.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Options controlling [`ProtobufDecoder`](super::ProtobufDecoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Reject invalid UTF-8 in proto2 `string` fields. proto3 strings are
    /// always validated.
    pub strict_utf8: bool,
    /// Maximum nesting of embedded messages and groups
    pub recursion_limit: u32,
    /// Drop unknown fields instead of preserving them
    pub discard_unknown: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_utf8: true,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            discard_unknown: false,
        }
    }
}

impl DecodeOptions {
    pub fn with_strict_utf8(mut self, strict_utf8: bool) -> Self {
        self.strict_utf8 = strict_utf8;
        self
    }

    pub fn with_recursion_limit(mut self, recursion_limit: u32) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }

    pub fn with_discard_unknown(mut self, discard_unknown: bool) -> Self {
        self.discard_unknown = discard_unknown;
        self
    }
}

/// Options controlling [`ProtobufEncoder`](super::ProtobufEncoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Emit map entries in key order so equal messages encode identically
    pub deterministic: bool,
    /// Skip the required-field check
    pub allow_partial: bool,
}

impl EncodeOptions {
    /// Options for reproducible output.
    pub fn deterministic() -> Self {
        Self {
            deterministic: true,
            allow_partial: false,
        }
    }

    pub fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    pub fn with_allow_partial(mut self, allow_partial: bool) -> Self {
        self.allow_partial = allow_partial;
        self
    }
}

/// Decode and encode options loaded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    pub decode: DecodeOptions,
    pub encode: EncodeOptions,
}

impl CodecConfig {
    /// Parse a TOML document. Missing tables and keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CodecError::parse("codec config", e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CodecError::parse(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&text)
    }
}
