//! # Compiled Schema Handles
//!
//! A [`SchemaHandle`] owns a schema after it has been parsed and linked by
//! the protobuf runtime (`protox` for parsing, `prost-reflect` for the
//! descriptor pool). It starts uncompiled, compiles exactly once, and is
//! read-only afterwards, so one handle can serve any number of concurrent
//! encode and decode calls without locking.
//!
//! Every read (lookup, verify, encode, decode) checks the compiled state
//! first and fails with [`CodecError::NotCompiled`] on a handle that never
//! loaded successfully.
//!
//! [`TypeHandle`] is the per-message view: it converts between [`Record`]s
//! and runtime messages and performs the actual byte-level work.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use prost::Message as _;
use prost_reflect::{
    DescriptorPool, DeserializeOptions, DynamicMessage, Kind, MessageDescriptor, SerializeOptions,
};
use protospark_core::{Record, TYPE_FIELD};
use protospark_schema::{RegisteredField, RegisteredType, SchemaDocument, TypeRegistry};
use protox::file::{ChainFileResolver, File, FileResolver, GoogleFileResolver};

use crate::error::CodecError;

/// Name under which an in-memory document is registered with the parser.
pub const INLINE_DOCUMENT_NAME: &str = "protospark.proto";

/// Package prefix of the runtime's bundled well-known types.
const WELL_KNOWN_PREFIX: &str = "google.protobuf.";

/// Resolves the single in-memory document; imports fall through to the
/// next resolver in the chain.
struct InlineResolver {
    source: String,
}

impl FileResolver for InlineResolver {
    fn resolve_path(&self, path: &Path) -> Option<String> {
        (path == Path::new(INLINE_DOCUMENT_NAME)).then(|| INLINE_DOCUMENT_NAME.to_string())
    }

    fn open_file(&self, name: &str) -> Result<File, protox::Error> {
        if name == INLINE_DOCUMENT_NAME {
            File::from_source(name, &self.source)
        } else {
            Err(protox::Error::file_not_found(name))
        }
    }
}

/// A schema loaded into the protobuf runtime.
#[derive(Debug, Clone, Default)]
pub struct SchemaHandle {
    pool: OnceLock<DescriptorPool>,
}

impl SchemaHandle {
    /// An uncompiled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a handle from schema document text.
    pub fn from_document(text: &str) -> Result<Self, CodecError> {
        let handle = Self::new();
        handle.compile_document(text)?;
        Ok(handle)
    }

    /// Compile a handle from the output of the schema compiler.
    pub fn from_compiled(document: &SchemaDocument) -> Result<Self, CodecError> {
        Self::from_document(document.as_str())
    }

    /// Compile a handle from schema files on disk.
    ///
    /// Each file's directory is used as an include root, so files can
    /// import their siblings; well-known imports resolve from the runtime's
    /// bundled copies.
    pub fn from_documents<I, P>(paths: I) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let handle = Self::new();
        handle.compile_documents(paths)?;
        Ok(handle)
    }

    /// Compile schema document text into this handle.
    ///
    /// Fails with [`CodecError::AlreadyCompiled`] if the handle already
    /// holds a schema.
    pub fn compile_document(&self, text: &str) -> Result<(), CodecError> {
        if self.is_compiled() {
            return Err(CodecError::AlreadyCompiled);
        }

        let mut resolver = ChainFileResolver::new();
        resolver.add(InlineResolver {
            source: text.to_string(),
        });
        resolver.add(GoogleFileResolver::new());

        let mut compiler = protox::Compiler::with_file_resolver(resolver);
        compiler
            .open_file(INLINE_DOCUMENT_NAME)
            .map_err(|e| CodecError::SchemaLoad {
                origin: INLINE_DOCUMENT_NAME.to_string(),
                reason: e.to_string(),
            })?;

        self.install(compiler.descriptor_pool(), INLINE_DOCUMENT_NAME)
    }

    /// Compile schema files on disk into this handle.
    pub fn compile_documents<I, P>(&self, paths: I) -> Result<(), CodecError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        if self.is_compiled() {
            return Err(CodecError::AlreadyCompiled);
        }

        let paths: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
        let origin = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if paths.is_empty() {
            return Err(CodecError::SchemaLoad {
                origin: "<none>".to_string(),
                reason: "no schema documents given".to_string(),
            });
        }

        let mut includes: Vec<PathBuf> = Vec::new();
        for path in &paths {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            if !includes.contains(&dir) {
                includes.push(dir);
            }
        }

        let load_error = |e: protox::Error| CodecError::SchemaLoad {
            origin: origin.clone(),
            reason: e.to_string(),
        };
        let mut compiler = protox::Compiler::new(&includes).map_err(load_error)?;
        for path in &paths {
            compiler.open_file(path).map_err(load_error)?;
        }

        self.install(compiler.descriptor_pool(), &origin)
    }

    fn install(&self, pool: DescriptorPool, origin: &str) -> Result<(), CodecError> {
        let messages = pool
            .all_messages()
            .filter(|m| !m.full_name().starts_with(WELL_KNOWN_PREFIX))
            .count();
        self.pool
            .set(pool)
            .map_err(|_| CodecError::AlreadyCompiled)?;
        tracing::debug!(origin, messages, "compiled schema");
        Ok(())
    }

    /// True once a schema has been loaded.
    pub fn is_compiled(&self) -> bool {
        self.pool.get().is_some()
    }

    /// The runtime's descriptor pool.
    pub fn descriptor_pool(&self) -> Result<&DescriptorPool, CodecError> {
        self.pool.get().ok_or(CodecError::NotCompiled)
    }

    /// Resolve a message type.
    ///
    /// Accepts a fully-qualified name, or a bare message name when exactly
    /// one message in the schema carries it.
    pub fn lookup(&self, type_name: &str) -> Result<TypeHandle, CodecError> {
        let pool = self.descriptor_pool()?;
        if let Some(descriptor) = pool.get_message_by_name(type_name) {
            return Ok(TypeHandle { descriptor });
        }
        if !type_name.contains('.') {
            let mut candidates = pool.all_messages().filter(|m| m.name() == type_name);
            if let (Some(descriptor), None) = (candidates.next(), candidates.next()) {
                return Ok(TypeHandle { descriptor });
            }
        }
        Err(CodecError::TypeNotFound {
            type_name: type_name.to_string(),
        })
    }

    /// Verify a record against the type named by its `type` member.
    pub fn verify(&self, record: &Record) -> Result<(), CodecError> {
        self.descriptor_pool()?;
        let type_name = record.type_name().ok_or(CodecError::MissingType)?;
        self.lookup(type_name)?.verify(record)
    }

    /// Fully-qualified names of every message in the schema, excluding the
    /// runtime's well-known types.
    pub fn message_names(&self) -> Result<Vec<String>, CodecError> {
        let pool = self.descriptor_pool()?;
        Ok(pool
            .all_messages()
            .map(|m| m.full_name().to_string())
            .filter(|name| !name.starts_with(WELL_KNOWN_PREFIX))
            .collect())
    }

    /// A type registry covering every message in the schema.
    ///
    /// Each message is registered under its fully-qualified name. A message
    /// inside a package is also registered under its bare name when no other
    /// message shares it, matching the names [`lookup`](Self::lookup)
    /// accepts.
    ///
    /// Parents are not recoverable from a schema document, so every entry
    /// has the base message as parent. Use the registry produced by the
    /// schema compiler when inheritance matters.
    pub fn type_registry(&self) -> Result<TypeRegistry, CodecError> {
        let names = self.message_names()?;
        let mut bare_counts: HashMap<&str, usize> = HashMap::new();
        for name in &names {
            *bare_counts.entry(bare_name(name)).or_default() += 1;
        }

        let mut builder = TypeRegistry::builder();
        for name in &names {
            let fields = self.lookup(name)?.fields();
            let bare = bare_name(name);
            if bare != name && bare_counts.get(bare) == Some(&1) {
                builder = builder.register(registered_type(bare, &fields));
            }
            builder = builder.register(registered_type(name, &fields));
        }
        Ok(builder.build())
    }
}

fn bare_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

fn registered_type(name: &str, fields: &[RegisteredField]) -> RegisteredType {
    fields
        .iter()
        .cloned()
        .fold(RegisteredType::new(name), RegisteredType::with_field)
}

/// One message type in a compiled schema.
#[derive(Debug, Clone)]
pub struct TypeHandle {
    descriptor: MessageDescriptor,
}

impl TypeHandle {
    /// Fully-qualified message name.
    pub fn name(&self) -> &str {
        self.descriptor.full_name()
    }

    /// The runtime descriptor.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Field map in number order.
    pub fn fields(&self) -> Vec<RegisteredField> {
        let mut fields: Vec<RegisteredField> = self
            .descriptor
            .fields()
            .map(|f| RegisteredField {
                name: f.json_name().to_string(),
                proto_name: f.name().to_string(),
                number: f.number(),
                type_name: kind_name(&f.kind()),
                repeated: f.is_list(),
            })
            .collect();
        fields.sort_by_key(|f| f.number);
        fields
    }

    /// True if field 1 is a singular `string type`, which predictive
    /// envelopes need for their tag slot.
    pub fn has_type_tag(&self) -> bool {
        self.descriptor.get_field(1).is_some_and(|f| {
            f.name() == TYPE_FIELD && matches!(f.kind(), Kind::String) && !f.is_list()
        })
    }

    /// Strict verification: unknown members and mistyped values fail.
    pub fn verify(&self, record: &Record) -> Result<(), CodecError> {
        self.to_message(record, true).map(|_| ())
    }

    /// Convert a record into a runtime message.
    ///
    /// With `strict` unknown record members are rejected; otherwise they
    /// are ignored. Mistyped values fail either way.
    pub fn to_message(&self, record: &Record, strict: bool) -> Result<DynamicMessage, CodecError> {
        let options = DeserializeOptions::new().deny_unknown_fields(strict);
        DynamicMessage::deserialize_with_options(
            self.descriptor.clone(),
            serde_json::Value::Object(record.as_map().clone()),
            &options,
        )
        .map_err(|e| CodecError::SchemaViolation {
            type_name: self.name().to_string(),
            detail: e.to_string(),
        })
    }

    /// Convert a runtime message into a record.
    ///
    /// Every field is present, defaults included; 64-bit integers are JSON
    /// numbers and keys are lowerCamelCase.
    pub fn from_message(&self, message: &DynamicMessage) -> Result<Record, CodecError> {
        let options = SerializeOptions::new()
            .skip_default_fields(false)
            .stringify_64_bit_integers(false);
        let value = message
            .serialize_with_options(serde_json::value::Serializer, &options)
            .map_err(|e| self.format_error(e.to_string()))?;
        Record::from_value(value).map_err(|e| self.format_error(e.to_string()))
    }

    /// Encode a record, verifying it first when `verify` is set.
    pub fn encode(&self, record: &Record, verify: bool) -> Result<Vec<u8>, CodecError> {
        Ok(self.to_message(record, verify)?.encode_to_vec())
    }

    /// Decode bytes into a record of this type.
    ///
    /// The `type` member holds whatever the payload carried; callers that
    /// know the type stamp it afterwards.
    pub fn decode(&self, bytes: &[u8]) -> Result<Record, CodecError> {
        let message = DynamicMessage::decode(self.descriptor.clone(), bytes)
            .map_err(|e| self.format_error(e.to_string()))?;
        self.from_message(&message)
    }

    fn format_error(&self, reason: String) -> CodecError {
        CodecError::DecodeFormat {
            target: self.name().to_string(),
            reason,
        }
    }
}

fn kind_name(kind: &Kind) -> String {
    match kind {
        Kind::Double => "double".to_string(),
        Kind::Float => "float".to_string(),
        Kind::Int32 => "int32".to_string(),
        Kind::Int64 => "int64".to_string(),
        Kind::Uint32 => "uint32".to_string(),
        Kind::Uint64 => "uint64".to_string(),
        Kind::Sint32 => "sint32".to_string(),
        Kind::Sint64 => "sint64".to_string(),
        Kind::Fixed32 => "fixed32".to_string(),
        Kind::Fixed64 => "fixed64".to_string(),
        Kind::Sfixed32 => "sfixed32".to_string(),
        Kind::Sfixed64 => "sfixed64".to_string(),
        Kind::Bool => "bool".to_string(),
        Kind::String => "string".to_string(),
        Kind::Bytes => "bytes".to_string(),
        Kind::Message(m) => m.full_name().to_string(),
        Kind::Enum(e) => e.full_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CORRECT: &str = r#"syntax="proto3";
message CorrectMessage {
  string type = 1;
  string some_field = 2;
}
message UntaggedMessage {
  string some_field = 1;
}
"#;

    #[test]
    fn test_uncompiled_handle_fails_fast() {
        let handle = SchemaHandle::new();
        assert!(!handle.is_compiled());
        assert!(matches!(handle.lookup("CorrectMessage"), Err(CodecError::NotCompiled)));
        assert!(matches!(
            handle.verify(&Record::of_type("CorrectMessage")),
            Err(CodecError::NotCompiled)
        ));
        assert!(matches!(handle.message_names(), Err(CodecError::NotCompiled)));
    }

    #[test]
    fn test_compiles_exactly_once() {
        let handle = SchemaHandle::new();
        handle.compile_document(CORRECT).unwrap();
        assert!(handle.is_compiled());
        assert!(matches!(
            handle.compile_document(CORRECT),
            Err(CodecError::AlreadyCompiled)
        ));
        // Still usable after the rejected second compile.
        assert!(handle.lookup("CorrectMessage").is_ok());
    }

    #[test]
    fn test_syntax_error_is_schema_load() {
        let err = SchemaHandle::from_document("message Broken { string type = ; }").unwrap_err();
        assert!(matches!(err, CodecError::SchemaLoad { ref origin, .. } if origin == INLINE_DOCUMENT_NAME));
    }

    #[test]
    fn test_lookup_missing_type_names_it() {
        let handle = SchemaHandle::from_document(CORRECT).unwrap();
        match handle.lookup("IncorrectMessage") {
            Err(CodecError::TypeNotFound { type_name }) => assert_eq!(type_name, "IncorrectMessage"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_message_names_exclude_well_known() {
        let doc = r#"syntax="proto3";
import "google/protobuf/timestamp.proto";
message StampedMessage {
  string type = 1;
  google.protobuf.Timestamp at = 2;
}
"#;
        let handle = SchemaHandle::from_document(doc).unwrap();
        assert_eq!(handle.message_names().unwrap(), vec!["StampedMessage".to_string()]);
    }

    #[test]
    fn test_type_tag_detection() {
        let handle = SchemaHandle::from_document(CORRECT).unwrap();
        assert!(handle.lookup("CorrectMessage").unwrap().has_type_tag());
        assert!(!handle.lookup("UntaggedMessage").unwrap().has_type_tag());
    }

    #[test]
    fn test_verify_strict_rejects_unknown_and_mistyped() {
        let handle = SchemaHandle::from_document(CORRECT).unwrap();
        let ok = Record::of_type("CorrectMessage").with("someField", "hello");
        handle.verify(&ok).unwrap();

        let unknown = ok.clone().with("surplus", 1);
        assert!(matches!(handle.verify(&unknown), Err(CodecError::SchemaViolation { .. })));

        let mistyped = Record::of_type("CorrectMessage").with("someField", json!({"nested": true}));
        assert!(matches!(handle.verify(&mistyped), Err(CodecError::SchemaViolation { .. })));

        assert!(matches!(
            handle.verify(&Record::new().with("someField", "x")),
            Err(CodecError::MissingType)
        ));
    }

    #[test]
    fn test_type_registry_accepts_bare_names_in_packages() {
        let doc = r#"syntax="proto3";
package demo;
message PingMessage {
  string type = 1;
  uint32 hops = 2;
}
"#;
        let handle = SchemaHandle::from_document(doc).unwrap();
        assert!(handle.lookup("PingMessage").is_ok());
        let registry = handle.type_registry().unwrap();
        assert!(registry.contains("demo.PingMessage"));
        assert_eq!(registry.get("PingMessage").map(|t| t.name()), Some("PingMessage"));
    }

    #[test]
    fn test_ambiguous_bare_names_stay_qualified() {
        let doc = r#"syntax="proto3";
package demo;
message Outer {
  message Inner { string type = 1; }
  Inner inner = 1;
}
message Inner {
  string type = 1;
}
"#;
        let handle = SchemaHandle::from_document(doc).unwrap();
        let registry = handle.type_registry().unwrap();
        assert!(registry.contains("demo.Inner"));
        assert!(registry.contains("demo.Outer.Inner"));
        assert!(!registry.contains("Inner"));
        assert!(registry.contains("Outer"));
    }

    #[test]
    fn test_type_registry_from_schema() {
        let handle = SchemaHandle::from_document(CORRECT).unwrap();
        let registry = handle.type_registry().unwrap();
        let correct = registry.get("CorrectMessage").unwrap();
        assert_eq!(correct.parent(), protospark_core::BASE_MESSAGE_TYPE);
        let names: Vec<_> = correct.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["type", "someField"]);
        assert_eq!(
            correct.instantiate().into_value(),
            json!({"type": "CorrectMessage", "someField": ""})
        );
    }
}
