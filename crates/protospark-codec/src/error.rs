//! # Codec Error Types
//!
//! One error enum covers schema loading, type resolution, encoding and
//! decoding. Errors are per call: none of them leave a shared
//! [`SchemaHandle`](crate::SchemaHandle) or type registry modified.
//!
//! | variant                  | meaning                                       |
//! |--------------------------|-----------------------------------------------|
//! | `NotCompiled`            | handle used before a successful compile       |
//! | `TypeNotFound`           | name absent from the loaded schema            |
//! | `UnknownPredictiveType`  | envelope names a type the registry lacks      |
//! | `MissingType`            | record has no usable `type` member            |
//! | `TypeNameTooLong`        | name does not fit the envelope's tag block    |
//! | `SchemaViolation`        | record does not conform to its message type   |
//! | `DecodeFormat`           | bytes cannot be parsed against the framing    |

use protospark_crypto::CipherError;
use thiserror::Error;

/// Errors from schema handles and the codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The handle has not been compiled.
    #[error("schema has not been compiled")]
    NotCompiled,

    /// The handle was already compiled; handles compile exactly once.
    #[error("schema is already compiled")]
    AlreadyCompiled,

    /// A schema document could not be loaded.
    #[error("schema load error for '{origin}': {reason}")]
    SchemaLoad {
        /// Document name or path.
        origin: String,
        /// Parser or resolver message.
        reason: String,
    },

    /// The type is not part of the loaded schema.
    #[error("type {type_name} not found; make sure the schema was compiled and the type exists")]
    TypeNotFound {
        /// The requested type name.
        type_name: String,
    },

    /// A predictive envelope names a type the registry does not know.
    #[error("predictive envelope carries unregistered type '{type_name}'")]
    UnknownPredictiveType {
        /// The decrypted type name.
        type_name: String,
    },

    /// The record carries no `type` member.
    #[error("type of the message is missing; every record must carry a non-empty string `type`")]
    MissingType,

    /// The type name exceeds the envelope tag's single-block capacity.
    #[error("type name '{type_name}' is {len} bytes; predictive envelopes hold at most {max}")]
    TypeNameTooLong {
        /// The offending type name.
        type_name: String,
        /// Its length in bytes.
        len: usize,
        /// The maximum length.
        max: usize,
    },

    /// The record does not conform to its message type.
    #[error("record does not conform to {type_name}: {detail}")]
    SchemaViolation {
        /// The resolved message type.
        type_name: String,
        /// Underlying violation.
        detail: String,
    },

    /// The bytes cannot be decoded.
    #[error("invalid input format for {target}: {reason}")]
    DecodeFormat {
        /// Decode target (a type name or the envelope framing).
        target: String,
        /// What went wrong, with byte offsets where known.
        reason: String,
    },

    /// Envelope tag cipher failure.
    #[error("envelope cipher error: {0}")]
    Cipher(#[from] CipherError),
}
