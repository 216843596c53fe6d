//! # Schema File Tests
//!
//! Loads schema documents from disk and exercises encode, decode and the
//! predictive envelope against them.

use std::path::PathBuf;

use protospark_codec::{Codec, CodecError, CodecOptions, EncodeOptions, SchemaHandle};
use protospark_core::Record;
use protospark_schema::{RegisteredType, TypeRegistry};
use serde_json::json;

/// Helper: path to a fixture file.
fn fixture(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(rel)
}

/// Helper: codec over both good fixtures.
fn good_codec() -> Codec {
    Codec::from_documents(
        [fixture("good/correct.proto"), fixture("good/correct3.proto")],
        &CodecOptions::default(),
    )
    .unwrap()
}

/// Helper: a conforming record.
fn correct(type_name: &str) -> Record {
    Record::of_type(type_name).with("someField", "some value")
}

/// Helper: registry holding the three fixture messages.
fn registry() -> TypeRegistry {
    ["CorrectMessage", "CorrectMessage2", "CorrectMessage3"]
        .into_iter()
        .map(RegisteredType::new)
        .collect()
}

// -- Loading ------------------------------------------------------------------

#[test]
fn test_loads_multiple_files() {
    let codec = good_codec();
    let mut names = codec.schema().message_names().unwrap();
    names.sort();
    assert_eq!(names, vec!["CorrectMessage", "CorrectMessage2", "CorrectMessage3"]);
}

#[test]
fn test_bad_file_fails_with_schema_load() {
    let err = SchemaHandle::from_documents([fixture("bad/syntax_error.proto")]).unwrap_err();
    match err {
        CodecError::SchemaLoad { origin, .. } => assert!(origin.ends_with("syntax_error.proto")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_missing_file_fails_with_schema_load() {
    let err = SchemaHandle::from_documents([fixture("good/absent.proto")]).unwrap_err();
    assert!(matches!(err, CodecError::SchemaLoad { .. }));
}

#[test]
fn test_empty_file_list_fails_with_schema_load() {
    let err = SchemaHandle::from_documents(Vec::<PathBuf>::new()).unwrap_err();
    assert!(matches!(err, CodecError::SchemaLoad { .. }));
}

#[test]
fn test_failed_compile_leaves_handle_uncompiled() {
    let handle = SchemaHandle::new();
    assert!(handle.compile_documents([fixture("bad/syntax_error.proto")]).is_err());
    assert!(!handle.is_compiled());
    handle
        .compile_documents([fixture("good/correct.proto")])
        .unwrap();
    assert!(matches!(
        handle.compile_documents([fixture("good/correct3.proto")]),
        Err(CodecError::AlreadyCompiled)
    ));
}

#[test]
fn test_generated_document_loads_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let env = protospark_schema::compile(&[protospark_core::RecordDefinition::builder(
        "PingSchemaDefinition",
    )
    .field(
        "hops",
        protospark_core::FieldDescriptor::scalar(protospark_core::ScalarKind::Uint32),
    )
    .build()])
    .unwrap();
    let path = env.document.write_to(tmp.path(), "ping.proto").unwrap();
    let handle = SchemaHandle::from_documents([path]).unwrap();
    assert!(handle.lookup("PingMessage").unwrap().has_type_tag());
}

// -- Explicit Decoding --------------------------------------------------------

#[test]
fn test_round_trip() {
    let codec = good_codec();
    for name in ["CorrectMessage", "CorrectMessage2"] {
        let bytes = codec.encode(&correct(name)).unwrap();
        assert_eq!(codec.decode_as(&bytes, name).unwrap(), correct(name));
    }
}

#[test]
fn test_round_trip_with_well_known_field() {
    let codec = good_codec();
    let record = correct("CorrectMessage3").with("seenAt", "2024-01-02T03:04:05Z");
    let bytes = codec.encode(&record).unwrap();
    assert_eq!(codec.decode_as(&bytes, "CorrectMessage3").unwrap(), record);
}

#[test]
fn test_unknown_type_on_encode() {
    let codec = good_codec();
    match codec.encode(&correct("IncorrectMessage")) {
        Err(CodecError::TypeNotFound { type_name }) => assert_eq!(type_name, "IncorrectMessage"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_unknown_type_on_decode() {
    let codec = good_codec();
    let bytes = codec.encode(&correct("CorrectMessage")).unwrap();
    assert!(matches!(
        codec.decode_as(&bytes, "IncorrectMessage"),
        Err(CodecError::TypeNotFound { .. })
    ));
}

#[test]
fn test_missing_type_on_encode() {
    let codec = good_codec();
    let record = Record::new().with("someField", "some value");
    assert!(matches!(codec.encode(&record), Err(CodecError::MissingType)));
    let blank = Record::of_type("").with("someField", "x");
    assert!(matches!(codec.encode(&blank), Err(CodecError::MissingType)));
}

#[test]
fn test_garbage_bytes_fail_with_decode_format() {
    let codec = good_codec();
    assert!(matches!(
        codec.decode_as(b"badbuffer", "CorrectMessage"),
        Err(CodecError::DecodeFormat { .. })
    ));
    assert!(matches!(
        codec.decode_predictive(b"badbuffer", &registry()),
        Err(CodecError::DecodeFormat { .. })
    ));
}

#[test]
fn test_schema_violation_names_the_type() {
    let codec = good_codec();
    let record = correct("CorrectMessage").with("notAField", true);
    match codec.encode(&record) {
        Err(CodecError::SchemaViolation { type_name, .. }) => assert_eq!(type_name, "CorrectMessage"),
        other => panic!("unexpected: {other:?}"),
    }
}

// -- Predictive Envelopes -----------------------------------------------------

#[test]
fn test_predictive_round_trip() {
    let codec = good_codec();
    for name in ["CorrectMessage", "CorrectMessage2", "CorrectMessage3"] {
        let bytes = codec.encode_predictive(&correct(name)).unwrap();
        let decoded = codec.decode_predictive(&bytes, &registry()).unwrap();
        assert_eq!(decoded.type_name(), Some(name));
        assert_eq!(decoded.get("someField"), Some(&json!("some value")));
    }
}

#[test]
fn test_predictive_without_verification() {
    let codec = good_codec();
    let record = correct("CorrectMessage").with("dropped", 1);
    let bytes = codec
        .encode_with(&record, EncodeOptions::new().verify(false).predictive(true))
        .unwrap();
    let decoded = codec.decode_predictive(&bytes, &registry()).unwrap();
    assert_eq!(decoded, correct("CorrectMessage"));
}

#[test]
fn test_plain_bytes_rejected_by_predictive_decode() {
    let codec = good_codec();
    let bytes = codec.encode(&correct("CorrectMessage")).unwrap();
    assert!(matches!(
        codec.decode_predictive(&bytes, &registry()),
        Err(CodecError::DecodeFormat { .. })
    ));
}

#[test]
fn test_envelope_decodes_explicitly() {
    let codec = good_codec();
    let bytes = codec.encode_predictive(&correct("CorrectMessage")).unwrap();
    let decoded = codec.decode_as(&bytes, "CorrectMessage").unwrap();
    assert_eq!(decoded, correct("CorrectMessage"));
}

#[test]
fn test_unregistered_predictive_type() {
    let codec = good_codec();
    let bytes = codec.encode_predictive(&correct("CorrectMessage3")).unwrap();
    let partial: TypeRegistry = [RegisteredType::new("CorrectMessage")].into_iter().collect();
    match codec.decode_predictive(&bytes, &partial) {
        Err(CodecError::UnknownPredictiveType { type_name }) => assert_eq!(type_name, "CorrectMessage3"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_registry_from_loaded_schema() {
    let codec = good_codec();
    let registry = codec.schema().type_registry().unwrap();
    let bytes = codec.encode_predictive(&correct("CorrectMessage3")).unwrap();
    let decoded = codec.decode_predictive(&bytes, &registry).unwrap();
    assert_eq!(decoded.type_name(), Some("CorrectMessage3"));
}

#[test]
fn test_packaged_schema_decodes_through_loaded_registry() {
    let doc = r#"syntax = "proto3";
package demo;
message PingMessage {
  string type = 1;
  string note = 2;
}
"#;
    let handle = SchemaHandle::from_document(doc).unwrap();
    let codec = Codec::new(handle, &CodecOptions::default()).unwrap();
    let registry = codec.schema().type_registry().unwrap();

    let record = Record::of_type("PingMessage").with("note", "hello");
    let bytes = codec.encode_predictive(&record).unwrap();
    let decoded = codec.decode_predictive(&bytes, &registry).unwrap();
    assert_eq!(decoded, record);
}

// -- Uncompiled Handles -------------------------------------------------------

#[test]
fn test_uncompiled_codec_fails_everywhere() {
    let codec = Codec::new(SchemaHandle::new(), &CodecOptions::default()).unwrap();
    let record = correct("CorrectMessage");
    assert!(matches!(codec.encode(&record), Err(CodecError::NotCompiled)));
    assert!(matches!(codec.encode_predictive(&record), Err(CodecError::NotCompiled)));
    assert!(matches!(codec.verify(&record), Err(CodecError::NotCompiled)));
    assert!(matches!(
        codec.decode_as(b"\x0a\x00", "CorrectMessage"),
        Err(CodecError::NotCompiled)
    ));
    assert!(matches!(
        codec.decode_predictive(b"badbuffer", &registry()),
        Err(CodecError::NotCompiled)
    ));
}
