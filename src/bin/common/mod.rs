// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _};
use clap::Args;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use protocodec::{CodecConfig, DescriptorPool, MessageDescriptor};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Install the stderr log subscriber, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load codec options, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    match path {
        Some(path) => CodecConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(CodecConfig::default()),
    }
}

/// Read and link a serialized FileDescriptorSet.
pub fn load_pool(path: &Path) -> Result<DescriptorPool> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    DescriptorPool::decode(&bytes)
        .with_context(|| format!("Invalid descriptor set {}", path.display()))
}

/// Look up a message type, listing close matches on failure.
pub fn find_message(pool: &DescriptorPool, type_name: &str) -> Result<MessageDescriptor> {
    pool.get_message_by_name(type_name).ok_or_else(|| {
        let short = type_name.rsplit('.').next().unwrap_or(type_name);
        let candidates: Vec<String> = pool
            .all_messages()
            .filter(|m| m.name() == short)
            .map(|m| m.full_name().to_string())
            .collect();
        if candidates.is_empty() {
            anyhow!("Message type not found: {type_name}")
        } else {
            anyhow!(
                "Message type not found: {type_name} (did you mean {}?)",
                candidates.join(", ")
            )
        }
    })
}

/// Payload source: a binary file or a hex string.
#[derive(Args, Clone, Debug)]
pub struct PayloadArgs {
    /// Binary payload file
    #[arg(short, long, value_name = "FILE", conflicts_with = "hex")]
    pub input: Option<PathBuf>,

    /// Payload as hex (whitespace ignored)
    #[arg(long, value_name = "HEX")]
    pub hex: Option<String>,
}

impl PayloadArgs {
    pub fn read(&self) -> Result<Vec<u8>> {
        match (&self.input, &self.hex) {
            (Some(path), _) => {
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
            }
            (None, Some(text)) => parse_hex(text),
            (None, None) => Err(anyhow!("Provide a payload with --input or --hex")),
        }
    }
}

/// Decode hex text, ignoring whitespace.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).with_context(|| format!("Invalid hex payload '{text}'"))
}

/// Print `value` as JSON, or run the human-readable printer.
pub fn output_json_or<T>(
    json: bool,
    value: &T,
    human_fn: impl FnOnce() -> std::io::Result<()>,
) -> Result<()>
where
    T: Serialize,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human_fn()?;
    }
    Ok(())
}
