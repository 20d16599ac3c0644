// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protocodec CLI
//!
//! Command-line tool for inspecting schemas and protobuf payloads.
//!
//! ## Usage
//!
//! ```sh
//! # List message types in a descriptor set
//! protocodec schema list schema.pb
//!
//! # Decode a payload to JSON
//! protocodec decode schema.pb pkg.Item --hex 0805
//!
//! # Re-encode deterministically
//! protocodec encode schema.pb pkg.Item --input item.bin
//!
//! # Compare two payloads structurally
//! protocodec compare schema.pb pkg.Item a.bin b.bin
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

mod cmd;
mod common;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use cmd::{CompareCmd, DecodeCmd, EncodeCmd, SchemaCmd};
use common::Result;
use protocodec::CodecError;
use tracing::debug;

/// Protocodec - protobuf schema and payload toolkit
///
/// Work with protobuf payloads at runtime using a compiled
/// FileDescriptorSet (`protoc --descriptor_set_out`), no generated code needed.
#[derive(Parser, Clone)]
#[command(name = "protocodec")]
#[command(about = "Protobuf schema and payload toolkit", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Codec options file (TOML with [decode] and [encode] tables)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Schema operations (list, show, validate)
    #[command(subcommand)]
    Schema(SchemaCmd),

    /// Decode a payload and print it as JSON
    Decode(DecodeCmd),

    /// Decode a payload and re-encode it deterministically
    Encode(EncodeCmd),

    /// Compare two payloads structurally
    Compare(CompareCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    common::init_tracing();
    let config = common::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Schema(cmd) => cmd.run(),
        Commands::Decode(cmd) => cmd.run(&config),
        Commands::Encode(cmd) => cmd.run(&config),
        Commands::Compare(cmd) => cmd.run(&config),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        if let Some(codec_err) = e.chain().find_map(|c| c.downcast_ref::<CodecError>()) {
            for (key, value) in codec_err.log_fields() {
                debug!(key, %value, "error detail");
            }
        }
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
