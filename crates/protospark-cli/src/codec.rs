//! # Encode and Decode Subcommands
//!
//! `encode` reads a JSON record and writes its binary encoding; `decode`
//! reads bytes and prints the record as JSON.
//!
//! Without `--type`, `decode` treats the input as a predictive envelope and
//! resolves its type against every message in the loaded schema.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use protospark_codec::{Codec, EncodeOptions};
use protospark_core::Record;

use crate::config::codec_options;

/// Arguments for the `protospark encode` subcommand.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Schema documents to load.
    #[arg(value_name = "PROTO", required = true)]
    pub protos: Vec<PathBuf>,

    /// JSON record to encode. Must carry a `type` member.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Where to write the encoded bytes.
    #[arg(long, short)]
    pub output: PathBuf,

    /// Produce a predictive envelope.
    #[arg(long)]
    pub predictive: bool,

    /// Skip strict verification; unknown members are dropped.
    #[arg(long)]
    pub no_verify: bool,
}

/// Arguments for the `protospark decode` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Schema documents to load.
    #[arg(value_name = "PROTO", required = true)]
    pub protos: Vec<PathBuf>,

    /// Encoded bytes.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Decode as this message type instead of reading the envelope tag.
    #[arg(long = "type", value_name = "NAME")]
    pub type_name: Option<String>,

    /// Write the JSON record here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the encode subcommand.
pub fn run_encode(args: &EncodeArgs, cipher_config: Option<&Path>) -> Result<u8> {
    let options = codec_options(cipher_config, !args.no_verify)?;
    let codec = Codec::from_documents(&args.protos, &options).context("failed to load schema")?;

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read record: {}", args.input.display()))?;
    let record: Record = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse record JSON: {}", args.input.display()))?;

    let encode = EncodeOptions::new()
        .verify(!args.no_verify)
        .predictive(args.predictive);
    let bytes = codec
        .encode_with(&record, encode)
        .with_context(|| format!("failed to encode {}", args.input.display()))?;

    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("failed to write output: {}", args.output.display()))?;
    tracing::info!(
        output = %args.output.display(),
        bytes = bytes.len(),
        predictive = args.predictive,
        "encoded record"
    );
    Ok(0)
}

/// Execute the decode subcommand.
pub fn run_decode(args: &DecodeArgs, cipher_config: Option<&Path>) -> Result<u8> {
    let options = codec_options(cipher_config, true)?;
    let codec = Codec::from_documents(&args.protos, &options).context("failed to load schema")?;

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read input: {}", args.input.display()))?;

    let record = match &args.type_name {
        Some(type_name) => codec.decode_as(&bytes, type_name)?,
        None => {
            let registry = codec.schema().type_registry()?;
            codec.decode_predictive(&bytes, &registry)?
        }
    };

    let rendered = serde_json::to_string_pretty(&record)?;
    match &args.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write output: {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(0)
}
