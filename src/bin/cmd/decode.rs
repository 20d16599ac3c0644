// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode command - print a payload as JSON.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::common::{find_message, load_pool, PayloadArgs, Result};
use protocodec::encoding::ProtobufDecoder;
use protocodec::{ops, CodecConfig};

/// Decode a payload and print it as JSON.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    /// Serialized FileDescriptorSet
    #[arg(value_name = "DESCRIPTOR_SET")]
    descriptor_set: PathBuf,

    /// Fully-qualified message type
    #[arg(value_name = "TYPE")]
    type_name: String,

    #[command(flatten)]
    payload: PayloadArgs,

    /// Fail if a required field is unset
    #[arg(long)]
    check_required: bool,

    /// Drop unknown fields instead of printing them
    #[arg(long)]
    discard_unknown: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

impl DecodeCmd {
    pub fn run(self, config: &CodecConfig) -> Result<()> {
        let pool = load_pool(&self.descriptor_set)?;
        let descriptor = find_message(&pool, &self.type_name)?;
        let data = self.payload.read()?;

        let mut options = config.decode;
        if self.discard_unknown {
            options = options.with_discard_unknown(true);
        }
        let message = ProtobufDecoder::with_options(options).decode(&descriptor, &data)?;
        debug!(
            type_name = %self.type_name,
            bytes = data.len(),
            unknown = message.unknown_fields().len(),
            "decoded payload"
        );

        if self.check_required {
            ops::check_initialized(&message)?;
        }

        let value = message.to_json_value();
        if self.compact {
            println!("{}", serde_json::to_string(&value)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Ok(())
    }
}
