// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf codec façade caching descriptors by message type name.

use tracing::debug;

use super::options::CodecConfig;
use super::{ProtobufDecoder, ProtobufEncoder};
use crate::core::{CodecError, Result, TypeRegistry};
use crate::reflect::DynamicMessage;
use crate::schema::{DescriptorPool, MessageDescriptor};

/// Protobuf codec for dynamic message encoding/decoding.
///
/// Each message type is registered once together with the
/// `FileDescriptorSet` that defines it; the linked pool and descriptor are
/// cached and shared by later calls. Uses thread-safe interior mutability for
/// caching, so one codec can serve many threads.
pub struct ProtobufCodec {
    /// Cached descriptor pools indexed by type name
    pools: TypeRegistry<DescriptorPool>,
    /// Cached message descriptors indexed by type name
    descriptors: TypeRegistry<MessageDescriptor>,
    config: CodecConfig,
}

impl ProtobufCodec {
    /// Create a codec with default options.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Create a codec with explicit decode/encode options.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            pools: TypeRegistry::new(),
            descriptors: TypeRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Add a FileDescriptorSet to the codec.
    ///
    /// # Arguments
    ///
    /// * `type_name` - Fully-qualified message type name (e.g., "pkg.Item")
    /// * `fds_bytes` - FileDescriptorSet binary data
    ///
    /// # Returns
    ///
    /// The message descriptor for the type. If the type was already
    /// registered the cached descriptor is returned and `fds_bytes` is ignored.
    pub fn add_file_descriptor_set(
        &self,
        type_name: &str,
        fds_bytes: &[u8],
    ) -> Result<MessageDescriptor> {
        self.descriptors.get_or_try_insert_with(type_name, || {
            let pool = DescriptorPool::decode(fds_bytes)?;
            self.descriptor_from_pool(type_name, pool)
        })
    }

    /// Register a type from an already built pool.
    pub fn add_pool(&self, type_name: &str, pool: &DescriptorPool) -> Result<MessageDescriptor> {
        self.descriptors.get_or_try_insert_with(type_name, || {
            self.descriptor_from_pool(type_name, pool.clone())
        })
    }

    fn descriptor_from_pool(
        &self,
        type_name: &str,
        pool: DescriptorPool,
    ) -> Result<MessageDescriptor> {
        let descriptor = pool
            .get_message_by_name(type_name)
            .ok_or_else(|| CodecError::type_not_found(type_name))?;
        self.pools.register(type_name, pool)?;
        debug!(type_name, "registered protobuf message type");
        Ok(descriptor)
    }

    /// Get a descriptor by type name without loading.
    pub fn get_descriptor(&self, type_name: &str) -> Option<MessageDescriptor> {
        self.descriptors.get(type_name).ok().flatten()
    }

    /// Pool the type was registered from.
    pub fn get_pool(&self, type_name: &str) -> Option<DescriptorPool> {
        self.pools.get(type_name).ok().flatten()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Result<Vec<String>> {
        self.descriptors.names()
    }

    /// Decode `data` as a message of a registered type.
    pub fn decode(&self, type_name: &str, data: &[u8]) -> Result<DynamicMessage> {
        let descriptor = self
            .get_descriptor(type_name)
            .ok_or_else(|| CodecError::type_not_found(type_name))?;
        ProtobufDecoder::with_options(self.config.decode).decode(&descriptor, data)
    }

    /// Encode `message` with the configured encode options.
    pub fn encode(&self, message: &DynamicMessage) -> Result<Vec<u8>> {
        ProtobufEncoder::with_options(self.config.encode).encode(message)
    }
}

impl Default for ProtobufCodec {
    fn default() -> Self {
        Self::new()
    }
}
