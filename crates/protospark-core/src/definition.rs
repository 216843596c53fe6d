//! # Record Definitions
//!
//! A record definition is a named, ordered bundle of field descriptors with
//! an optional explicit parent. Definitions are plain data: they are built
//! with [`RecordDefinition::builder`] or supplied statically by a type that
//! implements [`RecordSchema`].
//!
//! ```
//! use protospark_core::{FieldDescriptor, RecordDefinition, ScalarKind};
//!
//! let def = RecordDefinition::builder("TestSchemaDefinition")
//!     .field("testParamString", FieldDescriptor::scalar(ScalarKind::String))
//!     .field("testParamBool", FieldDescriptor::scalar(ScalarKind::Bool))
//!     .build();
//! assert_eq!(def.fields().len(), 2);
//! ```
//!
//! Validation (empty definitions, redefinitions, unknown references) is the
//! schema compiler's job; construction never fails.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::field::FieldDescriptor;
use crate::naming::MessageName;

/// Identity of a record definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an identity name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity of a statically described record.
    pub fn of<T: RecordSchema>() -> Self {
        Self(T::ID.to_string())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the schema message name for this identity.
    pub fn message_name(&self) -> Result<MessageName, ValidationError> {
        MessageName::derive(self)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A declarative, possibly-inheriting bundle of named field descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDefinition {
    id: RecordId,
    #[serde(default)]
    parent: Option<RecordId>,
    fields: Vec<(String, FieldDescriptor)>,
}

impl RecordDefinition {
    /// Start building a definition with the given identity.
    pub fn builder(id: impl Into<RecordId>) -> RecordDefinitionBuilder {
        RecordDefinitionBuilder {
            id: id.into(),
            parent: None,
            fields: Vec::new(),
        }
    }

    /// The definition described by `T`.
    pub fn of<T: RecordSchema>() -> Self {
        T::definition()
    }

    /// Identity of this definition.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Direct parent, if this definition extends another.
    pub fn parent(&self) -> Option<&RecordId> {
        self.parent.as_ref()
    }

    /// Own fields in declaration order (inherited fields excluded).
    pub fn fields(&self) -> &[(String, FieldDescriptor)] {
        &self.fields
    }

    /// Derived schema message name.
    pub fn message_name(&self) -> Result<MessageName, ValidationError> {
        self.id.message_name()
    }
}

/// Builder for [`RecordDefinition`].
#[derive(Debug, Clone)]
pub struct RecordDefinitionBuilder {
    id: RecordId,
    parent: Option<RecordId>,
    fields: Vec<(String, FieldDescriptor)>,
}

impl RecordDefinitionBuilder {
    /// Declare the direct parent definition.
    pub fn extends(mut self, parent: impl Into<RecordId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Append a field. Declaration order determines field numbering.
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.push((name.into(), descriptor));
        self
    }

    /// Finish the definition.
    pub fn build(self) -> RecordDefinition {
        RecordDefinition {
            id: self.id,
            parent: self.parent,
            fields: self.fields,
        }
    }
}

/// A statically described record shape.
///
/// Implementors list their own fields in declaration order and name their
/// parent explicitly:
///
/// ```
/// use protospark_core::{FieldDescriptor, RecordId, RecordSchema, ScalarKind};
///
/// struct Base;
/// impl RecordSchema for Base {
///     const ID: &'static str = "BaseSchemaDefinition";
///     fn fields() -> Vec<(&'static str, FieldDescriptor)> {
///         vec![("name", FieldDescriptor::scalar(ScalarKind::String))]
///     }
/// }
///
/// struct Extended;
/// impl RecordSchema for Extended {
///     const ID: &'static str = "ExtendedSchemaDefinition";
///     fn parent() -> Option<RecordId> {
///         Some(RecordId::of::<Base>())
///     }
///     fn fields() -> Vec<(&'static str, FieldDescriptor)> {
///         vec![("flag", FieldDescriptor::scalar(ScalarKind::Bool))]
///     }
/// }
///
/// let def = Extended::definition();
/// assert_eq!(def.parent().map(|p| p.as_str()), Some("BaseSchemaDefinition"));
/// ```
pub trait RecordSchema {
    /// Identity of the definition.
    const ID: &'static str;

    /// Direct parent, if any.
    fn parent() -> Option<RecordId> {
        None
    }

    /// Own fields in declaration order.
    fn fields() -> Vec<(&'static str, FieldDescriptor)>;

    /// Assemble the record definition.
    fn definition() -> RecordDefinition {
        let mut builder = RecordDefinition::builder(Self::ID);
        if let Some(parent) = Self::parent() {
            builder = builder.extends(parent);
        }
        for (name, descriptor) in Self::fields() {
            builder = builder.field(name, descriptor);
        }
        builder.build()
    }
}
