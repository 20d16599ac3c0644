// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - inspect and validate descriptor sets.

use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use crate::common::{find_message, load_pool, output_json_or, Result};
use protocodec::schema::{Cardinality, FieldDescriptor, MessageDescriptor};

/// Schema operations.
#[derive(Subcommand, Clone, Debug)]
pub enum SchemaCmd {
    /// List all message and enum types in a descriptor set
    List {
        /// Serialized FileDescriptorSet
        #[arg(value_name = "DESCRIPTOR_SET")]
        input: PathBuf,

        /// Include synthesized map entry types
        #[arg(long)]
        map_entries: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the fields of a message type
    Show {
        /// Serialized FileDescriptorSet
        #[arg(value_name = "DESCRIPTOR_SET")]
        input: PathBuf,

        /// Fully-qualified message type
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check that a descriptor set links
    Validate {
        /// Serialized FileDescriptorSet
        #[arg(value_name = "DESCRIPTOR_SET")]
        input: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl SchemaCmd {
    pub fn run(self) -> Result<()> {
        match self {
            SchemaCmd::List {
                input,
                map_entries,
                json,
            } => cmd_list(input, map_entries, json),
            SchemaCmd::Show {
                input,
                type_name,
                json,
            } => cmd_show(input, type_name, json),
            SchemaCmd::Validate { input, json } => cmd_validate(input, json),
        }
    }
}

fn cmd_list(input: PathBuf, map_entries: bool, json: bool) -> Result<()> {
    let pool = load_pool(&input)?;

    let mut items: Vec<TypeItem> = pool
        .all_messages()
        .filter(|m| map_entries || !m.is_map_entry())
        .map(|m| TypeItem {
            name: m.full_name().to_string(),
            kind: "message",
            file: m.file_name().to_string(),
            members: m.fields().len(),
        })
        .chain(pool.all_enums().map(|e| TypeItem {
            name: e.full_name().to_string(),
            kind: "enum",
            file: String::new(),
            members: e.values().len(),
        }))
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));

    output_json_or(json, &items, || {
        println!("=== Types in {} ===", input.display());
        println!();
        for item in &items {
            match item.kind {
                "message" => println!("message {} ({} fields)", item.name, item.members),
                _ => println!("enum    {} ({} values)", item.name, item.members),
            }
        }
        Ok(())
    })
}

fn cmd_show(input: PathBuf, type_name: String, json: bool) -> Result<()> {
    let pool = load_pool(&input)?;
    let message = find_message(&pool, &type_name)?;
    let detail = MessageDetail::new(&message);

    output_json_or(json, &detail, || {
        println!("=== {} ===", detail.name);
        println!("File: {}", detail.file);
        println!("Syntax: {}", detail.syntax);
        println!();
        for field in detail.fields.iter().chain(detail.extensions.iter()) {
            let mut line = format!(
                "  {:>5}  {} {} {}",
                field.number, field.label, field.type_name, field.name
            );
            if let Some(oneof) = &field.oneof {
                line.push_str(&format!(" (oneof {oneof})"));
            }
            if field.packed {
                line.push_str(" [packed]");
            }
            if let Some(default) = &field.default {
                line.push_str(&format!(" [default = {default}]"));
            }
            println!("{line}");
        }
        Ok(())
    })
}

fn cmd_validate(input: PathBuf, json: bool) -> Result<()> {
    let pool = load_pool(&input)?;

    let summary = ValidationSummary {
        files: pool.file_names().map(str::to_string).collect(),
        messages: pool.all_messages().count(),
        enums: pool.all_enums().count(),
    };

    output_json_or(json, &summary, || {
        println!("=== Validating {} ===", input.display());
        for file in &summary.files {
            println!("  ✓ {file}");
        }
        println!();
        println!(
            "Results: {} files, {} messages, {} enums",
            summary.files.len(),
            summary.messages,
            summary.enums
        );
        Ok(())
    })
}

#[derive(Serialize)]
struct ValidationSummary {
    files: Vec<String>,
    messages: usize,
    enums: usize,
}

#[derive(Serialize)]
struct TypeItem {
    name: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    file: String,
    members: usize,
}

#[derive(Serialize)]
struct MessageDetail {
    name: String,
    file: String,
    syntax: &'static str,
    fields: Vec<FieldItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extensions: Vec<FieldItem>,
}

impl MessageDetail {
    fn new(message: &MessageDescriptor) -> Self {
        Self {
            name: message.full_name().to_string(),
            file: message.file_name().to_string(),
            syntax: message.syntax().as_str(),
            fields: message.fields().map(|f| FieldItem::new(&f)).collect(),
            extensions: message.extensions().map(|f| FieldItem::new(&f)).collect(),
        }
    }
}

#[derive(Serialize)]
struct FieldItem {
    number: u32,
    name: String,
    label: &'static str,
    type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    oneof: Option<String>,
    packed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

impl FieldItem {
    fn new(field: &FieldDescriptor) -> Self {
        let label = if field.is_map() {
            "map"
        } else {
            match field.cardinality() {
                Cardinality::Optional => "optional",
                Cardinality::Required => "required",
                Cardinality::Repeated => "repeated",
            }
        };
        let type_name = match (field.map_key_field(), field.map_value_field()) {
            (Some(key), Some(value)) => {
                format!("<{}, {}>", key.kind().type_name(), value.kind().type_name())
            }
            _ => field.kind().type_name(),
        };
        let name = if field.is_extension() {
            format!("[{}]", field.full_name())
        } else {
            field.name().to_string()
        };
        Self {
            number: field.number(),
            name,
            label,
            type_name,
            oneof: field
                .containing_oneof()
                .filter(|o| !o.is_synthetic())
                .map(|o| o.name().to_string()),
            packed: field.is_packed(),
            default: field.declared_default().map(|v| format!("{v:?}")),
        }
    }
}
