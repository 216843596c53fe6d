//! # Cipher Error Types
//!
//! Structured errors for envelope tag encryption and cipher configuration.

use thiserror::Error;

/// Errors from envelope tag encryption.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Key material has the wrong length for the selected algorithm.
    #[error("invalid key length for {algo}: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Algorithm identifier.
        algo: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Supplied length in bytes.
        actual: usize,
    },

    /// The IV is not exactly one block.
    #[error("invalid IV length: expected 16 bytes, got {0}")]
    InvalidIvLength(usize),

    /// Hex decoding of key material or a tag failed.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// The plaintext does not fit a single cipher block after padding.
    #[error("plaintext is {len} bytes; a single-block tag holds at most {max}")]
    PlaintextTooLong {
        /// Plaintext length in bytes.
        len: usize,
        /// Maximum plaintext length in bytes.
        max: usize,
    },

    /// A tag is not exactly one hex-encoded block.
    #[error("tag must be {expected} hex characters, got {actual}")]
    InvalidTagLength {
        /// Required length in characters.
        expected: usize,
        /// Supplied length in characters.
        actual: usize,
    },

    /// Decryption produced invalid padding or non-UTF-8 plaintext.
    #[error("tag does not decrypt under the configured key: {0}")]
    Undecryptable(String),
}
