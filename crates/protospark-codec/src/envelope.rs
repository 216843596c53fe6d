//! # Predictive Envelope Framing
//!
//! A predictive envelope is an ordinary protobuf encoding whose field 1
//! (`string type`) holds the encrypted type tag instead of the plaintext
//! name. The tag is always [`TAG_HEX_LEN`] hex characters, so field 1 is
//! always the first thing on the wire with the same two-byte header:
//!
//! ```text
//! offset 0      0x0A        field 1, wire type 2 (length-delimited)
//! offset 1      0x20        length 32
//! offset 2..34  tag slot    lowercase hex of one cipher block
//! offset 34..   rest        remaining fields, in field-number order
//! ```
//!
//! Reading the slot needs no schema, which is what lets a decoder learn the
//! type before it picks a message descriptor.

use protospark_crypto::TAG_HEX_LEN;

use crate::error::CodecError;

/// Field 1 key byte: `(1 << 3) | 2`.
pub const TAG_FIELD_KEY: u8 = 0x0A;

/// Length of the tag slot in bytes.
pub const TAG_SLOT_LEN: usize = TAG_HEX_LEN;

/// Offset of the tag slot.
pub const TAG_SLOT_OFFSET: usize = 2;

/// The two bytes every predictive envelope starts with.
pub const ENVELOPE_PREFIX: [u8; TAG_SLOT_OFFSET] = [TAG_FIELD_KEY, TAG_SLOT_LEN as u8];

// The length must fit a single-byte varint.
const _: () = assert!(TAG_SLOT_LEN < 0x80);

const FRAMING: &str = "predictive envelope";

/// True if `bytes` starts with a complete envelope header and tag slot.
pub fn is_envelope(bytes: &[u8]) -> bool {
    tag_slot(bytes).is_ok()
}

/// Borrow the hex tag slot of an envelope.
pub fn tag_slot(bytes: &[u8]) -> Result<&str, CodecError> {
    let end = TAG_SLOT_OFFSET + TAG_SLOT_LEN;
    if bytes.len() < end {
        return Err(CodecError::DecodeFormat {
            target: FRAMING.to_string(),
            reason: format!(
                "need at least {end} bytes for the type tag, got {}",
                bytes.len()
            ),
        });
    }
    if bytes[..TAG_SLOT_OFFSET] != ENVELOPE_PREFIX {
        return Err(CodecError::DecodeFormat {
            target: FRAMING.to_string(),
            reason: format!(
                "expected header {:02x} {:02x} at offset 0, found {:02x} {:02x}",
                ENVELOPE_PREFIX[0], ENVELOPE_PREFIX[1], bytes[0], bytes[1]
            ),
        });
    }
    let slot = &bytes[TAG_SLOT_OFFSET..end];
    std::str::from_utf8(slot)
        .ok()
        .filter(|s| s.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| CodecError::DecodeFormat {
            target: FRAMING.to_string(),
            reason: format!("type tag at offset {TAG_SLOT_OFFSET} is not hex"),
        })
}
