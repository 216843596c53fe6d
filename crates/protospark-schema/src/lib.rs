//! # protospark-schema — Schema Compilation
//!
//! Turns a set of [`RecordDefinition`](protospark_core::RecordDefinition)s
//! into a single proto3 [`SchemaDocument`] and the [`TypeRegistry`] the
//! predictive decoder dispatches on.
//!
//! ## Compilation (`compiler`)
//!
//! [`SchemaCompiler`] validates the whole definition set up front (empty
//! definitions, redefinitions, unresolved kinds, oversized names, cycles)
//! and only then lays out messages. There is no partial output: one bad
//! definition fails the compile.
//!
//! ## Output (`document`, `registry`)
//!
//! - [`SchemaDocument`] is the rendered schema text plus its structured
//!   message blocks, a SHA-256 fingerprint, and a helper to write it out.
//! - [`TypeRegistry`] maps message names to parent, field map and a
//!   constructor closure. It is immutable once built and cheap to clone.
//!
//! ## Crate Policy
//!
//! - Depends only on `protospark-core` internally.
//! - Field numbering is a wire contract: the same definition set always
//!   compiles to the same numbers and the same document text.

pub mod compiler;
pub mod document;
pub mod registry;

pub use compiler::{compile, SchemaCompiler, SchemaEnvironment};
pub use document::{MessageBlock, SchemaDocument, SchemaField, SYNTAX_HEADER};
pub use registry::{
    Constructor, RegisteredField, RegisteredType, TypeRegistry, TypeRegistryBuilder,
};
