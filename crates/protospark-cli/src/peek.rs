//! # Peek Subcommand
//!
//! Prints the plaintext type name of a predictive envelope. Needs only the
//! cipher configuration, no schema.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use protospark_codec::{Codec, SchemaHandle};

use crate::config::codec_options;

/// Arguments for the `protospark peek` subcommand.
#[derive(Args, Debug)]
pub struct PeekArgs {
    /// Envelope bytes.
    #[arg(long, short)]
    pub input: PathBuf,
}

/// Execute the peek subcommand.
pub fn run_peek(args: &PeekArgs, cipher_config: Option<&Path>) -> Result<u8> {
    println!("{}", peek_type(&args.input, cipher_config)?);
    Ok(0)
}

/// Read the type name carried by the envelope at `path`.
pub fn peek_type(path: &Path, cipher_config: Option<&Path>) -> Result<String> {
    // Reading the tag never touches the schema, so an uncompiled handle will do.
    let codec = Codec::new(SchemaHandle::new(), &codec_options(cipher_config, true)?)
        .context("invalid cipher configuration")?;
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read input: {}", path.display()))?;
    codec
        .peek_type(&bytes)
        .with_context(|| format!("no readable type tag in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_bytes_have_no_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plain.bin");
        std::fs::write(&path, b"\x0a\x04Ping").unwrap();
        let err = peek_type(&path, None).unwrap_err();
        assert!(format!("{err:#}").contains("invalid input format for predictive envelope"));
    }
}
