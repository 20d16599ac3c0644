// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Compatibility surface for message types that bring their own codec.
//!
//! A concrete message type implements [`ProtoMessage`] to expose its
//! reflective view. It may additionally implement any of [`Marshaler`],
//! [`Unmarshaler`] and [`Merger`] and advertise them through the capability
//! probes; the free functions in this module check for the capability once
//! per call and prefer it over the generic reflective path.
//!
//! ```
//! use protocodec::legacy::{self, ProtoMessage};
//!
//! fn round_trip<M: ProtoMessage>(message: &M) -> protocodec::Result<M> {
//!     let bytes = legacy::marshal(message)?;
//!     let mut copy = message.new_instance();
//!     legacy::unmarshal(&mut copy, &bytes)?;
//!     Ok(copy)
//! }
//! ```

use tracing::trace;

use crate::core::Result;
use crate::encoding::{EncodeOptions, ProtobufEncoder};
use crate::ops;
use crate::reflect::DynamicMessage;

/// Implemented by messages that encode themselves.
pub trait Marshaler {
    /// Encode the message. Output should be deterministic valid wire data.
    fn marshal(&self) -> Result<Vec<u8>>;
}

/// Implemented by messages that decode themselves.
pub trait Unmarshaler {
    /// Decode `data` into the message. Must merge, not reset.
    fn unmarshal(&mut self, data: &[u8]) -> Result<()>;
}

/// Implemented by messages that merge themselves.
pub trait Merger {
    /// Merge `src` into the message, copying everything taken from it.
    fn merge(&mut self, src: &DynamicMessage) -> Result<()>;
}

/// A message with a reflective view and optional codec overrides.
pub trait ProtoMessage {
    /// Reflective view of the message contents.
    fn reflect(&self) -> &DynamicMessage;

    fn reflect_mut(&mut self) -> &mut DynamicMessage;

    /// New empty message of the same type.
    fn new_instance(&self) -> Self
    where
        Self: Sized;

    fn as_marshaler(&self) -> Option<&dyn Marshaler> {
        None
    }

    fn as_unmarshaler(&mut self) -> Option<&mut dyn Unmarshaler> {
        None
    }

    fn as_merger(&mut self) -> Option<&mut dyn Merger> {
        None
    }
}

impl ProtoMessage for DynamicMessage {
    fn reflect(&self) -> &DynamicMessage {
        self
    }

    fn reflect_mut(&mut self) -> &mut DynamicMessage {
        self
    }

    fn new_instance(&self) -> Self {
        DynamicMessage::new(self.descriptor().clone())
    }
}

/// Encode `message`, failing if a required field is unset.
pub fn marshal<M: ProtoMessage + ?Sized>(message: &M) -> Result<Vec<u8>> {
    if let Some(marshaler) = message.as_marshaler() {
        trace!("marshal via type override");
        return marshaler.marshal();
    }
    ProtobufEncoder::new().encode(message.reflect())
}

/// Encode `message` with map entries in key order.
pub fn marshal_deterministic<M: ProtoMessage + ?Sized>(message: &M) -> Result<Vec<u8>> {
    if let Some(marshaler) = message.as_marshaler() {
        trace!("marshal via type override");
        return marshaler.marshal();
    }
    ProtobufEncoder::with_options(EncodeOptions::deterministic()).encode(message.reflect())
}

/// Encoded size of `message`; 0 if a type override fails to encode.
pub fn size<M: ProtoMessage + ?Sized>(message: &M) -> usize {
    match message.as_marshaler() {
        Some(marshaler) => marshaler.marshal().map(|b| b.len()).unwrap_or(0),
        None => message.reflect().encoded_len(),
    }
}

/// Reset `message` and decode `data` into it.
pub fn unmarshal<M: ProtoMessage + ?Sized>(message: &mut M, data: &[u8]) -> Result<()> {
    reset(message);
    unmarshal_merge(message, data)
}

/// Decode `data` and merge it into `message`.
///
/// The generic path fails if a required field is unset afterwards.
pub fn unmarshal_merge<M: ProtoMessage + ?Sized>(message: &mut M, data: &[u8]) -> Result<()> {
    if let Some(unmarshaler) = message.as_unmarshaler() {
        trace!("unmarshal via type override");
        return unmarshaler.unmarshal(data);
    }
    message.reflect_mut().merge_from_bytes(data)?;
    ops::check_initialized(message.reflect())
}

/// Merge `src` into `dst`.
pub fn merge<D, S>(dst: &mut D, src: &S) -> Result<()>
where
    D: ProtoMessage + ?Sized,
    S: ProtoMessage + ?Sized,
{
    if let Some(merger) = dst.as_merger() {
        trace!("merge via type override");
        return merger.merge(src.reflect());
    }
    ops::merge(dst.reflect_mut(), src.reflect())
}

/// Deep copy of `src`: a new instance with `src` merged into it.
pub fn clone<M: ProtoMessage>(src: &M) -> Result<M> {
    let mut dst = src.new_instance();
    merge(&mut dst, src)?;
    Ok(dst)
}

/// Structural equality of the reflective views.
pub fn equal<X, Y>(x: &X, y: &Y) -> bool
where
    X: ProtoMessage + ?Sized,
    Y: ProtoMessage + ?Sized,
{
    ops::equal(x.reflect(), y.reflect())
}

/// Fail with the path of the first unset required field.
pub fn is_initialized<M: ProtoMessage + ?Sized>(message: &M) -> Result<()> {
    ops::check_initialized(message.reflect())
}

/// Clear every field, unknown fields included.
pub fn reset<M: ProtoMessage + ?Sized>(message: &mut M) {
    message.reflect_mut().clear();
}
