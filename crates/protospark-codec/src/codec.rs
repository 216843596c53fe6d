//! # Record Codec
//!
//! [`Codec`] pairs a compiled [`SchemaHandle`] with an [`EnvelopeCipher`]
//! and turns records into bytes and back.
//!
//! ## Encoding
//!
//! 1. Read the record's `type` member ([`CodecError::MissingType`] if absent).
//! 2. Resolve the type in the schema ([`CodecError::TypeNotFound`]).
//! 3. Verify the record when verification is on.
//! 4. Encode. A predictive encode first replaces `type` with its encrypted
//!    tag, so the output is a [predictive envelope](crate::envelope).
//!
//! ## Decoding
//!
//! - [`Codec::decode_as`] trusts the caller's type and stamps it on the
//!   result. Any bytes are accepted, envelopes included.
//! - [`Codec::decode_predictive`] reads the type from the envelope's tag
//!   slot, looks it up in a [`TypeRegistry`], decodes against the resolved
//!   message and merges the result over a fresh default-valued record.
//!
//! The codec holds no mutable state; share it freely across threads.

use std::path::Path;
use std::sync::Arc;

use prost_reflect::{DynamicMessage, ReflectMessage};
use protospark_core::{Record, TYPE_FIELD};
use protospark_crypto::{CipherConfig, EnvelopeCipher, MAX_TAG_PLAINTEXT_LEN};
use protospark_schema::{SchemaDocument, TypeRegistry};
use serde::{Deserialize, Serialize};

use crate::envelope;
use crate::error::CodecError;
use crate::handle::{SchemaHandle, TypeHandle};

/// Codec configuration.
///
/// ```yaml
/// verify_by_default: true
/// cipher:
///   algo: aes-128-cbc
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// Whether [`Codec::encode`] verifies records before encoding.
    pub verify_by_default: bool,
    /// Envelope tag cipher.
    pub cipher: CipherConfig,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            verify_by_default: true,
            cipher: CipherConfig::default(),
        }
    }
}

/// Per-call encode switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Reject unknown members before encoding. When off, unknown members
    /// are dropped, but mistyped values still fail.
    pub verify: bool,
    /// Produce a predictive envelope.
    pub predictive: bool,
}

impl EncodeOptions {
    /// Verified, non-predictive.
    pub fn new() -> Self {
        Self {
            verify: true,
            predictive: false,
        }
    }

    /// Set verification.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set predictive framing.
    pub fn predictive(mut self, predictive: bool) -> Self {
        self.predictive = predictive;
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoder and decoder over one compiled schema.
#[derive(Debug, Clone)]
pub struct Codec {
    schema: Arc<SchemaHandle>,
    cipher: EnvelopeCipher,
    verify_by_default: bool,
}

impl Codec {
    /// A codec over `schema`. The handle may still be uncompiled; calls
    /// then fail with [`CodecError::NotCompiled`].
    pub fn new(schema: SchemaHandle, options: &CodecOptions) -> Result<Self, CodecError> {
        Ok(Self {
            schema: Arc::new(schema),
            cipher: EnvelopeCipher::from_config(&options.cipher)?,
            verify_by_default: options.verify_by_default,
        })
    }

    /// A codec over schema document text.
    pub fn from_document(text: &str, options: &CodecOptions) -> Result<Self, CodecError> {
        Self::new(SchemaHandle::from_document(text)?, options)
    }

    /// A codec over the schema compiler's output.
    pub fn from_compiled(document: &SchemaDocument, options: &CodecOptions) -> Result<Self, CodecError> {
        Self::new(SchemaHandle::from_compiled(document)?, options)
    }

    /// A codec over schema files on disk.
    pub fn from_documents<I, P>(paths: I, options: &CodecOptions) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::new(SchemaHandle::from_documents(paths)?, options)
    }

    /// Replace the envelope cipher.
    pub fn with_cipher(mut self, cipher: EnvelopeCipher) -> Self {
        self.cipher = cipher;
        self
    }

    /// The underlying schema handle.
    pub fn schema(&self) -> &SchemaHandle {
        &self.schema
    }

    /// The envelope cipher.
    pub fn cipher(&self) -> &EnvelopeCipher {
        &self.cipher
    }

    /// Resolve a message type by name.
    pub fn lookup_type(&self, type_name: &str) -> Result<TypeHandle, CodecError> {
        self.schema.lookup(type_name)
    }

    /// Strictly verify a record against the type named by its `type` member.
    pub fn verify(&self, record: &Record) -> Result<(), CodecError> {
        self.schema.verify(record)
    }

    /// Encode a record, verifying according to [`CodecOptions::verify_by_default`].
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, CodecError> {
        self.encode_with(record, EncodeOptions::new().verify(self.verify_by_default))
    }

    /// Encode a record into a predictive envelope.
    pub fn encode_predictive(&self, record: &Record) -> Result<Vec<u8>, CodecError> {
        self.encode_with(
            record,
            EncodeOptions::new()
                .verify(self.verify_by_default)
                .predictive(true),
        )
    }

    /// Encode a record with explicit options.
    pub fn encode_with(&self, record: &Record, options: EncodeOptions) -> Result<Vec<u8>, CodecError> {
        self.schema.descriptor_pool()?;
        let type_name = record.type_name().ok_or(CodecError::MissingType)?;
        let handle = self.schema.lookup(type_name)?;

        if !options.predictive {
            return handle.encode(record, options.verify);
        }

        if options.verify {
            handle.verify(record)?;
        }
        if type_name.len() > MAX_TAG_PLAINTEXT_LEN {
            return Err(CodecError::TypeNameTooLong {
                type_name: type_name.to_string(),
                len: type_name.len(),
                max: MAX_TAG_PLAINTEXT_LEN,
            });
        }
        if !handle.has_type_tag() {
            return Err(CodecError::SchemaViolation {
                type_name: handle.name().to_string(),
                detail: format!("predictive envelopes need `string {TYPE_FIELD} = 1`"),
            });
        }

        let mut tagged = record.clone();
        tagged.set_type(self.cipher.encrypt_tag(type_name)?);
        let bytes = handle.encode(&tagged, false)?;
        tracing::trace!(type_name, len = bytes.len(), "encoded predictive envelope");
        Ok(bytes)
    }

    /// Decode bytes as `type_name`, stamping that name on the result.
    pub fn decode_as(&self, bytes: &[u8], type_name: &str) -> Result<Record, CodecError> {
        let handle = self.schema.lookup(type_name)?;
        let mut record = handle.decode(bytes)?;
        record.set_type(type_name);
        Ok(record)
    }

    /// Decode a predictive envelope, resolving its type through `registry`.
    ///
    /// Every field the message type declares comes from the payload;
    /// other members keep the values from the registered constructor.
    pub fn decode_predictive(&self, bytes: &[u8], registry: &TypeRegistry) -> Result<Record, CodecError> {
        self.schema.descriptor_pool()?;
        let type_name = self.peek_type(bytes)?;
        let Some(registered) = registry.get(&type_name) else {
            tracing::warn!(type_name = %type_name, "predictive envelope names an unregistered type");
            return Err(CodecError::UnknownPredictiveType { type_name });
        };

        let handle = self.schema.lookup(&type_name)?;
        let decoded = handle.decode(bytes)?;

        let mut record = registered.instantiate();
        record.extend(decoded.into_iter().filter(|(key, _)| key != TYPE_FIELD));
        record.set_type(registered.name());
        Ok(record)
    }

    /// Recover the plaintext type name from a predictive envelope without
    /// decoding the payload.
    pub fn peek_type(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let slot = envelope::tag_slot(bytes)?;
        self.cipher
            .decrypt_tag(slot)
            .map_err(|e| CodecError::DecodeFormat {
                target: "predictive envelope".to_string(),
                reason: format!(
                    "type tag at offset {} does not decrypt: {e}",
                    envelope::TAG_SLOT_OFFSET
                ),
            })
    }

    /// Convert a record into a runtime message, strictly or leniently.
    pub fn to_message(&self, record: &Record, strict: bool) -> Result<DynamicMessage, CodecError> {
        let type_name = record.type_name().ok_or(CodecError::MissingType)?;
        self.schema.lookup(type_name)?.to_message(record, strict)
    }

    /// Convert a runtime message into a record, stamping its message name
    /// as `type`.
    pub fn from_message(&self, message: &DynamicMessage) -> Result<Record, CodecError> {
        let handle = self.schema.lookup(message.descriptor().full_name())?;
        let mut record = handle.from_message(message)?;
        record.set_type(handle.name());
        Ok(record)
    }
}
