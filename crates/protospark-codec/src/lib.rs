//! # protospark-codec — Schema Handles and the Record Codec
//!
//! Loads schema documents into the protobuf runtime and moves [`Record`]s
//! to and from bytes.
//!
//! - [`SchemaHandle`]: a schema compiled exactly once, read-only afterwards.
//! - [`TypeHandle`]: one message type; verification, conversion, raw
//!   encode and decode.
//! - [`Codec`]: type-checked encoding, decoding by explicit type, and the
//!   predictive envelope, whose first field carries the encrypted type
//!   name so a decoder can pick the message type from the bytes alone.
//!
//! ## Crate Policy
//!
//! - Schema documents are parsed by `protox`; messages are handled
//!   dynamically through `prost-reflect`. Nothing is generated at build time.
//! - Every failure is a [`CodecError`]; no call leaves a handle or registry
//!   modified.
//!
//! [`Record`]: protospark_core::Record

pub mod codec;
pub mod envelope;
pub mod error;
pub mod handle;

pub use codec::{Codec, CodecOptions, EncodeOptions};
pub use envelope::{ENVELOPE_PREFIX, TAG_SLOT_LEN, TAG_SLOT_OFFSET};
pub use error::CodecError;
pub use handle::{SchemaHandle, TypeHandle, INLINE_DOCUMENT_NAME};
