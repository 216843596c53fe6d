//! # Cipher Configuration Loading
//!
//! Reads a [`CipherConfig`] from a YAML or JSON file (YAML is a superset, so
//! one parser covers both). Without a file the built-in key and IV apply.

use std::path::Path;

use anyhow::{Context, Result};
use protospark_codec::CodecOptions;
use protospark_crypto::CipherConfig;

/// Load cipher configuration, or the defaults when `path` is `None`.
pub fn load_cipher_config(path: Option<&Path>) -> Result<CipherConfig> {
    let Some(path) = path else {
        return Ok(CipherConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read cipher config: {}", path.display()))?;
    let config: CipherConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse cipher config: {}", path.display()))?;
    tracing::debug!(path = %path.display(), algo = %config.algo, "loaded cipher config");
    Ok(config)
}

/// Codec options with the cipher taken from `path`.
pub fn codec_options(path: Option<&Path>, verify: bool) -> Result<CodecOptions> {
    Ok(CodecOptions {
        verify_by_default: verify,
        cipher: load_cipher_config(path)?,
    })
}
