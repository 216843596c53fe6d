//! # Types Subcommand
//!
//! Loads schema files and lists every message with its field map.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use protospark_codec::SchemaHandle;

/// Arguments for the `protospark types` subcommand.
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Schema documents to load.
    #[arg(value_name = "PROTO", required = true)]
    pub protos: Vec<PathBuf>,

    /// Print the listing as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the types subcommand.
pub fn run_types(args: &TypesArgs) -> Result<u8> {
    let handle = SchemaHandle::from_documents(&args.protos).context("failed to load schema")?;
    let registry = handle.type_registry()?;

    if args.json {
        let listing: Vec<serde_json::Value> = registry
            .iter()
            .map(|t| serde_json::json!({ "name": t.name(), "fields": t.fields() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(0);
    }

    for registered in registry.iter() {
        println!("{}", registered.name());
        for field in registered.fields() {
            let label = if field.repeated { "repeated " } else { "" };
            println!(
                "  {:>3}  {label}{} {}",
                field.number, field.type_name, field.proto_name
            );
        }
    }
    Ok(0)
}
