//! # protospark-crypto — Envelope Crypto
//!
//! Obscures the type tag carried inside a predictive envelope. The cipher
//! is used for obfuscation only: it does not protect the payload, and the
//! built-in key and IV are public constants. Callers who need the tag to be
//! secret must configure their own key material.
//!
//! - [`EnvelopeCipher`] encrypts a type name into exactly one block and
//!   renders it as 32 lowercase hex characters.
//! - [`CipherConfig`] is the serde-facing configuration (`algo`, `key`, `iv`).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `protospark-*` crates.
//! - Key material is zeroized on drop and never printed by `Debug`.

pub mod cipher;
pub mod error;

pub use cipher::{
    CipherAlgorithm, CipherConfig, EnvelopeCipher, BLOCK_SIZE, DEFAULT_IV, DEFAULT_KEY_128,
    DEFAULT_KEY_256, MAX_TAG_PLAINTEXT_LEN, TAG_HEX_LEN,
};
pub use error::CipherError;
