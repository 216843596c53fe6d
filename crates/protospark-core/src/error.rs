//! # Error Types — Record Definition Validation
//!
//! Compile-time errors raised while turning record definitions into a
//! schema document. All errors use `thiserror` for derive-based `Display`
//! and `Error` implementations.
//!
//! Every variant names the offending definition, message or field so the
//! caller can fix the declaration without re-running the compiler under a
//! debugger. A validation error always aborts the whole compile.

use thiserror::Error;

/// A record definition set that cannot be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A definition declares no fields of its own.
    #[error("empty record definition '{definition}' is not allowed")]
    EmptyDefinition {
        /// Identity of the empty definition.
        definition: String,
    },

    /// A field name is declared twice, either within one definition or
    /// between a definition and one of its ancestors.
    #[error("illegal redefinition of field '{field}' in '{definition}' (already declared by '{declared_by}')")]
    FieldRedefinition {
        /// Definition that repeats the field.
        definition: String,
        /// The repeated field name.
        field: String,
        /// Definition that declared the field first.
        declared_by: String,
    },

    /// A field kind cannot be resolved against the compiled set.
    #[error("unsupported kind for field '{field}' in '{definition}': {reason}")]
    UnsupportedFieldKind {
        /// Definition owning the field.
        definition: String,
        /// The offending field name.
        field: String,
        /// Why the kind was rejected.
        reason: String,
    },

    /// A derived message name does not fit the envelope's fixed-width slot.
    #[error("message name '{message}' is {len} bytes, exceeding the {max}-byte limit")]
    MessageNameTooLong {
        /// The derived message name.
        message: String,
        /// Its length in bytes.
        len: usize,
        /// The maximum permitted length.
        max: usize,
    },

    /// A derived message name is not usable as a schema identifier.
    #[error("invalid message name '{message}': {reason}")]
    InvalidMessageName {
        /// The derived message name.
        message: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two definitions in one compile share an identity.
    #[error("record definition '{definition}' appears more than once")]
    DuplicateDefinition {
        /// The repeated identity.
        definition: String,
    },

    /// A definition names a parent that is not part of the compiled set.
    #[error("record definition '{definition}' extends '{parent}', which is not part of the compiled set")]
    UnknownParent {
        /// The child definition.
        definition: String,
        /// The missing parent.
        parent: String,
    },

    /// Record references or parent links form a cycle.
    #[error("cyclic record definitions: {}", cycle.join(" -> "))]
    CyclicReference {
        /// The definitions on the cycle, first element repeated at the end.
        cycle: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_name_error_names_offender() {
        let err = ValidationError::MessageNameTooLong {
            message: "AVeryLongMessage".into(),
            len: 40,
            max: 32,
        };
        let text = err.to_string();
        assert!(text.contains("AVeryLongMessage"));
        assert!(text.contains("32-byte"));
    }

    #[test]
    fn test_cycle_display_joins_path() {
        let err = ValidationError::CyclicReference {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "cyclic record definitions: A -> B -> A");
    }
}
