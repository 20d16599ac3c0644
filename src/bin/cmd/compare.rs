// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Compare command - structural equality of two payloads.

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::Args;
use serde::Serialize;

use crate::common::{find_message, load_pool, output_json_or, parse_hex, Result};
use protocodec::encoding::ProtobufDecoder;
use protocodec::{ops, CodecConfig};

/// Compare two payloads of the same type.
#[derive(Args, Clone, Debug)]
pub struct CompareCmd {
    /// Serialized FileDescriptorSet
    #[arg(value_name = "DESCRIPTOR_SET")]
    descriptor_set: PathBuf,

    /// Fully-qualified message type
    #[arg(value_name = "TYPE")]
    type_name: String,

    /// First payload
    #[arg(value_name = "LEFT")]
    left: String,

    /// Second payload
    #[arg(value_name = "RIGHT")]
    right: String,

    /// Treat LEFT and RIGHT as hex strings instead of file paths
    #[arg(long)]
    hex: bool,

    /// Exit with status 1 when the payloads differ
    #[arg(long)]
    exit_code: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct Comparison {
    equal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    difference: Option<String>,
}

impl CompareCmd {
    pub fn run(self, config: &CodecConfig) -> Result<()> {
        let pool = load_pool(&self.descriptor_set)?;
        let descriptor = find_message(&pool, &self.type_name)?;
        let decoder = ProtobufDecoder::with_options(config.decode);

        let left = decoder
            .decode(&descriptor, &self.read(&self.left)?)
            .context("Failed to decode LEFT")?;
        let right = decoder
            .decode(&descriptor, &self.read(&self.right)?)
            .context("Failed to decode RIGHT")?;

        let difference = ops::first_difference(&left, &right);
        let comparison = Comparison {
            equal: difference.is_none(),
            difference,
        };

        output_json_or(self.json, &comparison, || {
            match &comparison.difference {
                None => println!("equal"),
                Some(path) => println!("differ at {path}"),
            }
            Ok(())
        })?;

        if self.exit_code && !comparison.equal {
            bail!("payloads differ");
        }
        Ok(())
    }

    fn read(&self, source: &str) -> Result<Vec<u8>> {
        if self.hex {
            parse_hex(source)
        } else {
            std::fs::read(source).with_context(|| format!("Failed to read {source}"))
        }
    }
}
