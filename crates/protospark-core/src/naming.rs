//! # Message Naming
//!
//! Derives schema message names from record definition identities and
//! converts property names into schema field names.
//!
//! ## Invariant
//!
//! A [`MessageName`] is at most [`MAX_MESSAGE_NAME_LEN`] bytes. The bound
//! comes from the predictive envelope, whose type tag occupies a fixed
//! 32-byte slot. Oversized names are rejected, never truncated. Names are
//! ASCII identifiers and never equal [`BASE_MESSAGE_TYPE`].

use serde::{Deserialize, Serialize};

use crate::definition::RecordId;
use crate::error::ValidationError;

/// Suffix stripped from a definition identity when deriving its message name.
pub const DEFINITION_SUFFIX: &str = "SchemaDefinition";

/// Suffix appended to every derived message name.
pub const MESSAGE_SUFFIX: &str = "Message";

/// Maximum length of a message name, in bytes.
pub const MAX_MESSAGE_NAME_LEN: usize = 32;

/// Parent name recorded for messages with no record-definition ancestor.
pub const BASE_MESSAGE_TYPE: &str = "Message";

/// Name of the implicit leading field carrying the runtime type tag.
pub const TYPE_FIELD: &str = "type";

/// A validated schema message name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageName(String);

impl MessageName {
    /// Validate an explicit message name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.len() > MAX_MESSAGE_NAME_LEN {
            return Err(ValidationError::MessageNameTooLong {
                len: name.len(),
                message: name,
                max: MAX_MESSAGE_NAME_LEN,
            });
        }
        if !is_identifier(&name) {
            return Err(ValidationError::InvalidMessageName {
                message: name,
                reason: "message names must be ASCII identifiers".to_string(),
            });
        }
        if name == BASE_MESSAGE_TYPE {
            return Err(ValidationError::InvalidMessageName {
                message: name,
                reason: format!("'{BASE_MESSAGE_TYPE}' is reserved for the base message type"),
            });
        }
        Ok(Self(name))
    }

    /// Derive the message name for a record definition identity.
    ///
    /// `TestSchemaDefinition` becomes `TestMessage`; identities without the
    /// definition suffix simply gain the message suffix.
    pub fn derive(id: &RecordId) -> Result<Self, ValidationError> {
        let stem = id.as_str().strip_suffix(DEFINITION_SUFFIX).unwrap_or(id.as_str());
        Self::new(format!("{stem}{MESSAGE_SUFFIX}"))
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a derived name; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for MessageName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageName> for String {
    fn from(name: MessageName) -> Self {
        name.0
    }
}

impl AsRef<str> for MessageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// True if `name` is an ASCII identifier: a letter or `_`, then letters,
/// digits or `_`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

/// Convert a lowerCamelCase property name to snake_case.
///
/// `testParamString` becomes `test_param_string`. Names already in
/// snake_case pass through unchanged.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// The protobuf JSON name of a snake_case field name.
///
/// Underscores are dropped and the character after each one is
/// uppercased: `test_param_string` becomes `testParamString`. Decoded
/// records use these names as keys.
pub fn json_name(proto_name: &str) -> String {
    let mut out = String::with_capacity(proto_name.len());
    let mut upper_next = false;
    for ch in proto_name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
