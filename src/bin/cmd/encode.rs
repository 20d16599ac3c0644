// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode command - canonicalize a payload by re-encoding it.

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use crate::common::{find_message, load_pool, PayloadArgs, Result};
use protocodec::encoding::{ProtobufDecoder, ProtobufEncoder};
use protocodec::CodecConfig;

/// Decode a payload and write it back out.
///
/// Map entries are written in key order unless `--no-deterministic` is given.
#[derive(Args, Clone, Debug)]
pub struct EncodeCmd {
    /// Serialized FileDescriptorSet
    #[arg(value_name = "DESCRIPTOR_SET")]
    descriptor_set: PathBuf,

    /// Fully-qualified message type
    #[arg(value_name = "TYPE")]
    type_name: String,

    #[command(flatten)]
    payload: PayloadArgs,

    /// Write binary output to a file instead of printing hex
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Keep map entries in storage order
    #[arg(long)]
    no_deterministic: bool,

    /// Encode even if a required field is unset
    #[arg(long)]
    allow_partial: bool,
}

impl EncodeCmd {
    pub fn run(self, config: &CodecConfig) -> Result<()> {
        let pool = load_pool(&self.descriptor_set)?;
        let descriptor = find_message(&pool, &self.type_name)?;
        let data = self.payload.read()?;

        let message = ProtobufDecoder::with_options(config.decode).decode(&descriptor, &data)?;

        let options = config
            .encode
            .with_deterministic(!self.no_deterministic)
            .with_allow_partial(self.allow_partial || config.encode.allow_partial);
        let bytes = ProtobufEncoder::with_options(options).encode(&message)?;

        match self.output {
            Some(path) => fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => println!("{}", hex::encode(&bytes)),
        }
        Ok(())
    }
}
