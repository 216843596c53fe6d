//! # Field Descriptors
//!
//! A [`FieldDescriptor`] is the leaf of the data model: one field's wire
//! kind plus its repeated-cardinality flag. Kinds form a closed set:
//!
//! - [`ScalarKind`] — the proto3 scalar value types.
//! - [`WellKnownKind`] — the `google.protobuf.*` structured types, each
//!   bound to a fixed import path.
//! - A reference to another record definition by [`RecordId`].
//!
//! Descriptors are immutable once declared.

use serde::{Deserialize, Serialize};

use crate::definition::{RecordId, RecordSchema};

/// Primitive wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarKind {
    /// All scalar kinds, in declaration order.
    pub const ALL: [ScalarKind; 15] = [
        Self::Double,
        Self::Float,
        Self::Int32,
        Self::Int64,
        Self::Uint32,
        Self::Uint64,
        Self::Sint32,
        Self::Sint64,
        Self::Fixed32,
        Self::Fixed64,
        Self::Sfixed32,
        Self::Sfixed64,
        Self::Bool,
        Self::String,
        Self::Bytes,
    ];

    /// The type keyword used in the schema document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// Parse a schema keyword back into a scalar kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == keyword)
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured `google.protobuf` types with a fixed import path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WellKnownKind {
    Any,
    Api,
    BoolValue,
    BytesValue,
    DoubleValue,
    Duration,
    Empty,
    Enum,
    EnumValue,
    Field,
    Cardinality,
    Kind,
    FieldMask,
    FloatValue,
    Int32Value,
    Int64Value,
    ListValue,
    Method,
    Mixin,
    NullValue,
    Option,
    SourceContext,
    StringValue,
    Struct,
    Syntax,
    Timestamp,
    Type,
    UInt32Value,
    UInt64Value,
    Value,
}

impl WellKnownKind {
    /// All well-known kinds, in declaration order.
    pub const ALL: [WellKnownKind; 30] = [
        Self::Any,
        Self::Api,
        Self::BoolValue,
        Self::BytesValue,
        Self::DoubleValue,
        Self::Duration,
        Self::Empty,
        Self::Enum,
        Self::EnumValue,
        Self::Field,
        Self::Cardinality,
        Self::Kind,
        Self::FieldMask,
        Self::FloatValue,
        Self::Int32Value,
        Self::Int64Value,
        Self::ListValue,
        Self::Method,
        Self::Mixin,
        Self::NullValue,
        Self::Option,
        Self::SourceContext,
        Self::StringValue,
        Self::Struct,
        Self::Syntax,
        Self::Timestamp,
        Self::Type,
        Self::UInt32Value,
        Self::UInt64Value,
        Self::Value,
    ];

    /// Fully-qualified type name, e.g. `google.protobuf.Timestamp`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Any => "google.protobuf.Any",
            Self::Api => "google.protobuf.Api",
            Self::BoolValue => "google.protobuf.BoolValue",
            Self::BytesValue => "google.protobuf.BytesValue",
            Self::DoubleValue => "google.protobuf.DoubleValue",
            Self::Duration => "google.protobuf.Duration",
            Self::Empty => "google.protobuf.Empty",
            Self::Enum => "google.protobuf.Enum",
            Self::EnumValue => "google.protobuf.EnumValue",
            Self::Field => "google.protobuf.Field",
            Self::Cardinality => "google.protobuf.Field.Cardinality",
            Self::Kind => "google.protobuf.Field.Kind",
            Self::FieldMask => "google.protobuf.FieldMask",
            Self::FloatValue => "google.protobuf.FloatValue",
            Self::Int32Value => "google.protobuf.Int32Value",
            Self::Int64Value => "google.protobuf.Int64Value",
            Self::ListValue => "google.protobuf.ListValue",
            Self::Method => "google.protobuf.Method",
            Self::Mixin => "google.protobuf.Mixin",
            Self::NullValue => "google.protobuf.NullValue",
            Self::Option => "google.protobuf.Option",
            Self::SourceContext => "google.protobuf.SourceContext",
            Self::StringValue => "google.protobuf.StringValue",
            Self::Struct => "google.protobuf.Struct",
            Self::Syntax => "google.protobuf.Syntax",
            Self::Timestamp => "google.protobuf.Timestamp",
            Self::Type => "google.protobuf.Type",
            Self::UInt32Value => "google.protobuf.UInt32Value",
            Self::UInt64Value => "google.protobuf.UInt64Value",
            Self::Value => "google.protobuf.Value",
        }
    }

    /// Import path that declares this type.
    pub fn import_path(&self) -> &'static str {
        match self {
            Self::Any => "google/protobuf/any.proto",
            Self::Api | Self::Method | Self::Mixin => "google/protobuf/api.proto",
            Self::BoolValue
            | Self::BytesValue
            | Self::DoubleValue
            | Self::FloatValue
            | Self::Int32Value
            | Self::Int64Value
            | Self::StringValue
            | Self::UInt32Value
            | Self::UInt64Value => "google/protobuf/wrappers.proto",
            Self::Duration => "google/protobuf/duration.proto",
            Self::Empty => "google/protobuf/empty.proto",
            Self::Enum
            | Self::EnumValue
            | Self::Field
            | Self::Cardinality
            | Self::Kind
            | Self::Option
            | Self::Syntax
            | Self::Type => "google/protobuf/type.proto",
            Self::FieldMask => "google/protobuf/field_mask.proto",
            Self::ListValue | Self::NullValue | Self::Struct | Self::Value => {
                "google/protobuf/struct.proto"
            }
            Self::SourceContext => "google/protobuf/source_context.proto",
            Self::Timestamp => "google/protobuf/timestamp.proto",
        }
    }

    /// Resolve a fully-qualified type name to its well-known kind.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }
}

impl std::fmt::Display for WellKnownKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The wire kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// A proto3 scalar.
    Scalar(ScalarKind),
    /// A `google.protobuf.*` structured type.
    WellKnown(WellKnownKind),
    /// A reference to another record definition in the same compile.
    Record(RecordId),
}

impl From<ScalarKind> for FieldKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl From<WellKnownKind> for FieldKind {
    fn from(kind: WellKnownKind) -> Self {
        Self::WellKnown(kind)
    }
}

impl From<RecordId> for FieldKind {
    fn from(id: RecordId) -> Self {
        Self::Record(id)
    }
}

/// One record field's wire kind and cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Wire kind.
    pub kind: FieldKind,
    /// Whether the field holds a list of values.
    #[serde(default)]
    pub repeated: bool,
}

impl FieldDescriptor {
    /// A singular field of the given kind.
    pub fn new(kind: impl Into<FieldKind>) -> Self {
        Self {
            kind: kind.into(),
            repeated: false,
        }
    }

    /// A singular scalar field.
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(kind)
    }

    /// A singular well-known field.
    pub fn well_known(kind: WellKnownKind) -> Self {
        Self::new(kind)
    }

    /// A singular field holding the record described by `T`.
    pub fn record<T: RecordSchema>() -> Self {
        Self::new(RecordId::of::<T>())
    }

    /// Mark this field as repeated.
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Import path required by this field's kind, if any.
    pub fn import_path(&self) -> Option<&'static str> {
        match &self.kind {
            FieldKind::WellKnown(wk) => Some(wk.import_path()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_keyword_roundtrip() {
        for kind in ScalarKind::ALL {
            assert_eq!(ScalarKind::from_keyword(kind.as_str()), Some(kind));
        }
        assert_eq!(ScalarKind::from_keyword("varchar"), None);
    }

    #[test]
    fn test_well_known_imports() {
        assert_eq!(
            WellKnownKind::Timestamp.import_path(),
            "google/protobuf/timestamp.proto"
        );
        assert_eq!(
            WellKnownKind::StringValue.import_path(),
            "google/protobuf/wrappers.proto"
        );
        assert_eq!(WellKnownKind::Any.type_name(), "google.protobuf.Any");
        for kind in WellKnownKind::ALL {
            assert!(kind.type_name().starts_with("google.protobuf."));
            assert!(kind.import_path().starts_with("google/protobuf/"));
            assert_eq!(WellKnownKind::from_type_name(kind.type_name()), Some(kind));
        }
    }

    #[test]
    fn test_descriptor_builders() {
        let f = FieldDescriptor::scalar(ScalarKind::Bool).repeated();
        assert!(f.repeated);
        assert_eq!(f.kind, FieldKind::Scalar(ScalarKind::Bool));
        assert_eq!(f.import_path(), None);

        let ts = FieldDescriptor::well_known(WellKnownKind::Duration);
        assert_eq!(ts.import_path(), Some("google/protobuf/duration.proto"));
    }

    #[test]
    fn test_scalar_serde_lowercase() {
        let json = serde_json::to_string(&ScalarKind::Sfixed32).unwrap();
        assert_eq!(json, "\"sfixed32\"");
    }
}
