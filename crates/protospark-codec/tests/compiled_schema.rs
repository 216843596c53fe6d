//! # Compiled Schema Tests
//!
//! Feeds schema compiler output straight into the codec: nested records,
//! well-known fields, structural inheritance and registry-driven
//! predictive decoding.

use protospark_codec::{Codec, CodecError, CodecOptions};
use protospark_core::{
    FieldDescriptor, Record, RecordDefinition, RecordId, RecordSchema, ScalarKind, WellKnownKind,
};
use protospark_schema::{SchemaCompiler, SchemaEnvironment};
use serde_json::json;

struct Base;
impl RecordSchema for Base {
    const ID: &'static str = "BaseSchemaDefinition";
    fn fields() -> Vec<(&'static str, FieldDescriptor)> {
        vec![
            ("label", FieldDescriptor::scalar(ScalarKind::String)),
            ("weight", FieldDescriptor::scalar(ScalarKind::Int64)),
        ]
    }
}

struct Child;
impl RecordSchema for Child {
    const ID: &'static str = "ChildSchemaDefinition";
    fn parent() -> Option<RecordId> {
        Some(RecordId::of::<Base>())
    }
    fn fields() -> Vec<(&'static str, FieldDescriptor)> {
        vec![
            ("extraFlag", FieldDescriptor::scalar(ScalarKind::Bool)),
            ("createdAt", FieldDescriptor::well_known(WellKnownKind::Timestamp)),
        ]
    }
}

/// Helper: compile Base, Child and a nesting record.
fn environment() -> SchemaEnvironment {
    SchemaCompiler::new()
        .define::<Base>()
        .define::<Child>()
        .add(
            RecordDefinition::builder("NestSchemaDefinition")
                .field("inner", FieldDescriptor::record::<Base>())
                .field("history", FieldDescriptor::record::<Child>().repeated())
                .field("tags", FieldDescriptor::scalar(ScalarKind::String).repeated())
                .build(),
        )
        .compile()
        .unwrap()
}

/// Helper: codec plus compiler registry.
fn codec() -> (Codec, protospark_schema::TypeRegistry) {
    let (document, registry) = environment().into_parts();
    let codec = Codec::from_compiled(&document, &CodecOptions::default()).unwrap();
    (codec, registry)
}

/// Helper: a populated child record.
fn child() -> Record {
    Record::of_type("ChildMessage")
        .with("label", "leaf")
        .with("weight", 42)
        .with("extraFlag", true)
        .with("createdAt", "2023-05-06T07:08:09Z")
}

#[test]
fn test_compiled_document_loads() {
    let (codec, registry) = codec();
    let mut names = codec.schema().message_names().unwrap();
    names.sort();
    assert_eq!(names, vec!["BaseMessage", "ChildMessage", "NestMessage"]);
    for name in &names {
        assert!(registry.contains(name));
    }
}

#[test]
fn test_child_round_trip() {
    let (codec, _) = codec();
    let bytes = codec.encode(&child()).unwrap();
    assert_eq!(codec.decode_as(&bytes, "ChildMessage").unwrap(), child());
}

#[test]
fn test_child_decodes_as_parent() {
    let (codec, _) = codec();
    let bytes = codec.encode(&child()).unwrap();
    let as_base = codec.decode_as(&bytes, "BaseMessage").unwrap();
    assert_eq!(
        as_base.into_value(),
        json!({"type": "BaseMessage", "label": "leaf", "weight": 42})
    );
}

#[test]
fn test_nested_round_trip() {
    let (codec, _) = codec();
    let nest = Record::of_type("NestMessage")
        .with("inner", json!({"type": "BaseMessage", "label": "in", "weight": 1}))
        .with("history", json!([child().into_value()]))
        .with("tags", json!(["a", "b"]));
    let bytes = codec.encode(&nest).unwrap();
    assert_eq!(codec.decode_as(&bytes, "NestMessage").unwrap(), nest);
}

#[test]
fn test_predictive_uses_compiler_registry_defaults() {
    let (codec, registry) = codec();
    let sparse = Record::of_type("ChildMessage").with("label", "only");
    let bytes = codec.encode_predictive(&sparse).unwrap();
    let decoded = codec.decode_predictive(&bytes, &registry).unwrap();
    assert_eq!(decoded.type_name(), Some("ChildMessage"));
    assert_eq!(decoded.get("label"), Some(&json!("only")));
    assert_eq!(decoded.get("weight"), Some(&json!(0)));
    assert_eq!(decoded.get("extraFlag"), Some(&json!(false)));
    assert_eq!(decoded.get("createdAt"), None);
}

#[test]
fn test_unset_nested_fields_decode_the_same_both_ways() {
    let (codec, registry) = codec();
    let sparse = Record::of_type("NestMessage").with("tags", json!(["x"]));
    let explicit = codec
        .decode_as(&codec.encode(&sparse).unwrap(), "NestMessage")
        .unwrap();
    let predictive = codec
        .decode_predictive(&codec.encode_predictive(&sparse).unwrap(), &registry)
        .unwrap();
    assert_eq!(predictive, explicit);
    assert_eq!(
        predictive.into_value(),
        json!({"type": "NestMessage", "history": [], "tags": ["x"]})
    );
}

#[test]
fn test_multi_word_field_names_round_trip_both_ways() {
    let env = SchemaCompiler::new()
        .add(
            RecordDefinition::builder("WordsSchemaDefinition")
                .field("someField", FieldDescriptor::scalar(ScalarKind::String))
                .field("field2Name", FieldDescriptor::scalar(ScalarKind::Uint32))
                .field("aBC", FieldDescriptor::scalar(ScalarKind::Bool))
                .build(),
        )
        .compile()
        .unwrap();
    let (document, registry) = env.into_parts();
    let codec = Codec::from_compiled(&document, &CodecOptions::default()).unwrap();
    let record = Record::of_type("WordsMessage")
        .with("someField", "hello")
        .with("field2Name", 2)
        .with("aBC", true);

    let explicit = codec
        .decode_as(&codec.encode(&record).unwrap(), "WordsMessage")
        .unwrap();
    assert_eq!(explicit, record);

    let predictive = codec
        .decode_predictive(&codec.encode_predictive(&record).unwrap(), &registry)
        .unwrap();
    assert_eq!(predictive, record);
    assert_eq!(predictive.len(), 4);
}

#[test]
fn test_mistyped_nested_value_is_violation() {
    let (codec, _) = codec();
    let nest = Record::of_type("NestMessage").with("inner", "not a message");
    assert!(matches!(
        codec.encode(&nest),
        Err(CodecError::SchemaViolation { .. })
    ));
}

#[test]
fn test_long_compiled_name_cannot_be_predictive() {
    let env = SchemaCompiler::new()
        .add(
            RecordDefinition::builder("RatherVerboseSchemaDefinition")
                .field("n", FieldDescriptor::scalar(ScalarKind::Int32))
                .build(),
        )
        .compile()
        .unwrap();
    let codec = Codec::from_compiled(&env.document, &CodecOptions::default()).unwrap();
    let record = Record::of_type("RatherVerboseMessage").with("n", 3);
    assert!(codec.encode(&record).is_ok());
    assert!(matches!(
        codec.encode_predictive(&record),
        Err(CodecError::TypeNameTooLong { .. })
    ));
}
