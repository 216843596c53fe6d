//! # protospark-core — Foundational Types
//!
//! The leaf crate of the Protospark workspace. It defines the declarative
//! vocabulary callers use to describe message shapes, plus the dynamic
//! [`Record`] value that flows through the codec.
//!
//! ## Key Design Principles
//!
//! 1. **Closed kind enumerations.** [`ScalarKind`] and [`WellKnownKind`] are
//!    exhaustive; every well-known kind maps to exactly one import path.
//!
//! 2. **Explicit registration instead of reflection.** A record definition
//!    lists its fields through [`RecordDefinition::builder`] or the
//!    [`RecordSchema`] trait. Inheritance is an explicit parent pointer.
//!
//! 3. **Bounded message names.** [`MessageName`] can only be constructed
//!    through a validating constructor that enforces the 32-byte limit
//!    imposed by the predictive envelope.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `protospark-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod definition;
pub mod error;
pub mod field;
pub mod naming;
pub mod record;

// Re-export primary types for ergonomic imports.
pub use definition::{RecordDefinition, RecordDefinitionBuilder, RecordId, RecordSchema};
pub use error::ValidationError;
pub use field::{FieldDescriptor, FieldKind, ScalarKind, WellKnownKind};
pub use naming::{
    camel_to_snake, is_identifier, json_name, MessageName, BASE_MESSAGE_TYPE, DEFINITION_SUFFIX, MAX_MESSAGE_NAME_LEN,
    MESSAGE_SUFFIX, TYPE_FIELD,
};
pub use record::Record;
