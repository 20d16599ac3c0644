// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for protocodec.
//!
//! Errors fall into a few families:
//! - Schema resolution (descriptor pool construction)
//! - Wire decoding (truncation, malformed varints, wire type mismatches)
//! - Required-field completeness
//! - Type mismatches between messages of different descriptors
//!
//! Every error is a value returned up the call stack; none abort the process.

use thiserror::Error;

/// Errors that can occur while building descriptors or encoding/decoding messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Parse error in schema input or configuration
    #[error("Parse error in {context}: {message}")]
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Schema could not be resolved into a descriptor graph
    #[error("Invalid schema '{schema_name}': {reason}")]
    InvalidSchema {
        /// Type or file the problem was found in
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// Type not found in a descriptor pool
    #[error("Type not found: '{type_name}'")]
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Buffer too short for requested read
    #[error("Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available")]
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Varint longer than 10 bytes or overflowing 64 bits
    #[error("Invalid varint at position {cursor_pos}")]
    InvalidVarint {
        /// Cursor position where the varint started
        cursor_pos: u64,
    },

    /// Tag with field number 0, out-of-range number, or unknown wire type
    #[error("Invalid tag {tag:#x} at position {cursor_pos}: {reason}")]
    InvalidTag {
        /// Raw tag value
        tag: u64,
        /// Cursor position where the tag started
        cursor_pos: u64,
        /// Why the tag was rejected
        reason: String,
    },

    /// Length-delimited payload exceeds the enclosing buffer
    #[error("Length {length} exceeds buffer at position {position} (buffer length: {buffer_len})")]
    LengthExceeded {
        /// Length that was read
        length: usize,
        /// Position in buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },

    /// Wire type on the wire does not fit the declared field type
    #[error("Field '{field_name}' expects wire type {expected} but found {actual} at position {cursor_pos}")]
    WireTypeMismatch {
        /// Full field name
        field_name: String,
        /// Wire type(s) the field accepts
        expected: String,
        /// Wire type found on the wire
        actual: u8,
        /// Cursor position of the tag
        cursor_pos: u64,
    },

    /// End-group tag without matching start, or mismatched group number
    #[error("Unexpected end group for field {field_number} at position {cursor_pos}")]
    UnexpectedEndGroup {
        /// Field number carried by the end-group tag
        field_number: u32,
        /// Cursor position of the tag
        cursor_pos: u64,
    },

    /// String field payload is not valid UTF-8
    #[error("Invalid UTF-8 in string field '{field_name}'")]
    InvalidUtf8 {
        /// Full field name
        field_name: String,
    },

    /// Nesting exceeded the configured recursion limit
    #[error("Recursion limit of {limit} exceeded while decoding")]
    RecursionLimit {
        /// Configured limit
        limit: u32,
    },

    /// A required field is unset
    #[error("Required field not set: {path}")]
    RequiredNotSet {
        /// Dotted path of the first missing field
        path: String,
    },

    /// Operation between messages of different descriptors
    #[error("Message type mismatch: expected '{expected}', found '{actual}'")]
    TypeMismatch {
        /// Descriptor of the receiving message
        expected: String,
        /// Descriptor of the other message
        actual: String,
    },

    /// Value does not fit the field it is being stored in
    #[error("Invalid value for field '{field_name}': expected {expected}")]
    InvalidValue {
        /// Full field name
        field_name: String,
        /// Expected value shape
        expected: String,
    },

    /// Unsupported type or feature
    #[error("Unsupported feature: '{feature}'")]
    Unsupported {
        /// What is not supported
        feature: String,
    },

    /// Encoding error
    #[error("{codec} encode error: {message}")]
    EncodeError {
        /// Codec context
        codec: String,
        /// Error message
        message: String,
    },

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl CodecError {
    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        CodecError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(codec: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::EncodeError {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        CodecError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        CodecError::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Create an invalid tag error.
    pub fn invalid_tag(tag: u64, cursor_pos: u64, reason: impl Into<String>) -> Self {
        CodecError::InvalidTag {
            tag,
            cursor_pos,
            reason: reason.into(),
        }
    }

    /// Create a required-field error for the given dotted path.
    pub fn required_not_set(path: impl Into<String>) -> Self {
        CodecError::RequiredNotSet { path: path.into() }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(field_name: impl Into<String>, expected: impl Into<String>) -> Self {
        CodecError::InvalidValue {
            field_name: field_name.into(),
            expected: expected.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        CodecError::Unsupported {
            feature: feature.into(),
        }
    }

    /// True for errors produced while reading wire data.
    ///
    /// A message that saw a decode error holds partial state and should be discarded.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CodecError::BufferTooShort { .. }
                | CodecError::InvalidVarint { .. }
                | CodecError::InvalidTag { .. }
                | CodecError::LengthExceeded { .. }
                | CodecError::WireTypeMismatch { .. }
                | CodecError::UnexpectedEndGroup { .. }
                | CodecError::InvalidUtf8 { .. }
                | CodecError::RecursionLimit { .. }
        )
    }

    /// True if this error reports a missing required field.
    pub fn is_required_not_set(&self) -> bool {
        matches!(self, CodecError::RequiredNotSet { .. })
    }

    /// Dotted path of the missing required field, if this is a required-field error.
    pub fn missing_path(&self) -> Option<&str> {
        match self {
            CodecError::RequiredNotSet { path } => Some(path),
            _ => None,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::InvalidSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            CodecError::TypeNotFound { type_name } => vec![("type", type_name.clone())],
            CodecError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            CodecError::InvalidVarint { cursor_pos } => vec![("cursor", cursor_pos.to_string())],
            CodecError::InvalidTag {
                tag,
                cursor_pos,
                reason,
            } => vec![
                ("tag", tag.to_string()),
                ("cursor", cursor_pos.to_string()),
                ("reason", reason.clone()),
            ],
            CodecError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => vec![
                ("length", length.to_string()),
                ("position", position.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
            CodecError::WireTypeMismatch {
                field_name,
                expected,
                actual,
                cursor_pos,
            } => vec![
                ("field", field_name.clone()),
                ("expected", expected.clone()),
                ("actual", actual.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            CodecError::UnexpectedEndGroup {
                field_number,
                cursor_pos,
            } => vec![
                ("field_number", field_number.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            CodecError::InvalidUtf8 { field_name } => vec![("field", field_name.clone())],
            CodecError::RecursionLimit { limit } => vec![("limit", limit.to_string())],
            CodecError::RequiredNotSet { path } => vec![("path", path.clone())],
            CodecError::TypeMismatch { expected, actual } => {
                vec![("expected", expected.clone()), ("actual", actual.clone())]
            }
            CodecError::InvalidValue {
                field_name,
                expected,
            } => vec![("field", field_name.clone()), ("expected", expected.clone())],
            CodecError::Unsupported { feature } => vec![("feature", feature.clone())],
            CodecError::EncodeError { codec, message } => {
                vec![("codec", codec.clone()), ("message", message.clone())]
            }
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::EncodeError {
            codec: "IO".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<prost::DecodeError> for CodecError {
    fn from(err: prost::DecodeError) -> Self {
        CodecError::parse("FileDescriptorSet", err.to_string())
    }
}

/// Result type for protocodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
