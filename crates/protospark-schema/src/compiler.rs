//! # Schema Compiler
//!
//! Compiles an ordered set of record definitions into one schema document
//! and its type registry.
//!
//! ## Phases
//!
//! 1. **Index.** Reject duplicate identities; derive every message name
//!    (rejecting names over the 32-byte bound, non-identifiers and the
//!    reserved base name).
//! 2. **Validate.** Reject empty definitions, unknown parents, malformed
//!    field names, references outside the compiled set, and cycles through
//!    parent links or record references. A field name must equal the
//!    protobuf JSON name of its snake_case form, since decoded records use
//!    that name as the key.
//! 3. **Lay out.** Every message opens with the implicit `string type = 1`.
//!    Inherited fields follow, root-most ancestor first, then the
//!    definition's own fields. Numbers increase by one in that order, so a
//!    child's inherited fields keep the numbers they have in the parent and
//!    a child payload decodes as its parent.
//! 4. **Emit.** Render the document (imports deduplicated in first-use
//!    order) and register each message with its parent and field map.
//!
//! Validation completes for the whole set before anything is emitted;
//! a failure leaves no partial document behind.

use std::collections::{BTreeMap, HashMap};

use protospark_core::{
    camel_to_snake, is_identifier, json_name, FieldDescriptor, FieldKind, MessageName,
    RecordDefinition, RecordId, RecordSchema, ValidationError, BASE_MESSAGE_TYPE, TYPE_FIELD,
};

use crate::document::{MessageBlock, SchemaDocument, SchemaField};
use crate::registry::{RegisteredField, RegisteredType, TypeRegistry};

/// The compiler's output: the schema document and its type registry.
#[derive(Debug, Clone)]
pub struct SchemaEnvironment {
    /// Rendered schema document.
    pub document: SchemaDocument,
    /// Message name → parent, field map, constructor.
    pub registry: TypeRegistry,
}

impl SchemaEnvironment {
    /// Split into `(document, registry)`.
    pub fn into_parts(self) -> (SchemaDocument, TypeRegistry) {
        (self.document, self.registry)
    }
}

/// Collects record definitions and compiles them.
///
/// ```
/// use protospark_core::{FieldDescriptor, RecordDefinition, ScalarKind};
/// use protospark_schema::SchemaCompiler;
///
/// let env = SchemaCompiler::new()
///     .add(
///         RecordDefinition::builder("TestSchemaDefinition")
///             .field("testParamString", FieldDescriptor::scalar(ScalarKind::String))
///             .field("testParamBool", FieldDescriptor::scalar(ScalarKind::Bool))
///             .build(),
///     )
///     .compile()
///     .unwrap();
/// assert!(env.document.as_str().contains("string test_param_string = 2;"));
/// assert!(env.registry.contains("TestMessage"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    definitions: Vec<RecordDefinition>,
}

impl SchemaCompiler {
    /// An empty compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the definition described by `T`.
    pub fn define<T: RecordSchema>(self) -> Self {
        self.add(T::definition())
    }

    /// Add a definition. Order determines message order in the document.
    pub fn add(mut self, definition: RecordDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Definitions collected so far.
    pub fn definitions(&self) -> &[RecordDefinition] {
        &self.definitions
    }

    /// Compile the collected definitions.
    pub fn compile(&self) -> Result<SchemaEnvironment, ValidationError> {
        compile(&self.definitions)
    }
}

/// A field placed in a message layout.
#[derive(Debug, Clone)]
struct LaidOutField {
    name: String,
    proto_name: String,
    number: u32,
    type_name: String,
    repeated: bool,
    import: Option<&'static str>,
}

/// Compile an ordered set of record definitions.
pub fn compile(definitions: &[RecordDefinition]) -> Result<SchemaEnvironment, ValidationError> {
    let index = index_definitions(definitions)?;
    validate_definitions(definitions, &index)?;
    detect_cycles(definitions, &index)?;

    let mut imports: Vec<String> = Vec::new();
    let mut blocks = Vec::with_capacity(definitions.len());
    let mut registry = TypeRegistry::builder();

    for def in definitions {
        let layout = lay_out(def, &index)?;
        let message_name = index.message_name(def.id());

        for field in &layout {
            if let Some(import) = field.import {
                if !imports.iter().any(|i| i == import) {
                    imports.push(import.to_string());
                }
            }
        }

        let parent = match def.parent() {
            Some(parent) => index.message_name(parent).to_string(),
            None => BASE_MESSAGE_TYPE.to_string(),
        };

        let mut registered = RegisteredType::new(message_name.as_str()).with_parent(parent);
        for field in &layout {
            registered = registered.with_field(RegisteredField {
                name: field.name.clone(),
                proto_name: field.proto_name.clone(),
                number: field.number,
                type_name: field.type_name.clone(),
                repeated: field.repeated,
            });
        }
        registry = registry.register(registered);

        blocks.push(MessageBlock {
            name: message_name.clone(),
            fields: layout
                .into_iter()
                .map(|f| SchemaField {
                    name: f.proto_name,
                    type_name: f.type_name,
                    number: f.number,
                    repeated: f.repeated,
                })
                .collect(),
        });
    }

    let document = SchemaDocument::render(imports, blocks);
    tracing::debug!(
        messages = definitions.len(),
        imports = document.imports().len(),
        fingerprint = %document.fingerprint(),
        "compiled record definitions"
    );

    Ok(SchemaEnvironment {
        document,
        registry: registry.build(),
    })
}

// ---------------------------------------------------------------------------
// Indexing
// ---------------------------------------------------------------------------

struct DefinitionIndex<'a> {
    by_id: HashMap<&'a RecordId, &'a RecordDefinition>,
    names: HashMap<&'a RecordId, MessageName>,
}

impl<'a> DefinitionIndex<'a> {
    fn get(&self, id: &RecordId) -> Option<&'a RecordDefinition> {
        self.by_id.get(id).copied()
    }

    // Callers only pass ids that passed validation.
    fn message_name(&self, id: &RecordId) -> &MessageName {
        &self.names[id]
    }
}

fn index_definitions(
    definitions: &[RecordDefinition],
) -> Result<DefinitionIndex<'_>, ValidationError> {
    let mut by_id = HashMap::with_capacity(definitions.len());
    let mut names = HashMap::with_capacity(definitions.len());
    let mut seen_names: HashMap<MessageName, &RecordId> = HashMap::new();

    for def in definitions {
        if by_id.insert(def.id(), def).is_some() {
            return Err(ValidationError::DuplicateDefinition {
                definition: def.id().to_string(),
            });
        }
        let name = def.message_name()?;
        // Distinct identities may still collapse to one message name
        // (`Foo` and `FooSchemaDefinition`).
        if let Some(other) = seen_names.insert(name.clone(), def.id()) {
            return Err(ValidationError::DuplicateDefinition {
                definition: format!("{} (message {name} also derived from {other})", def.id()),
            });
        }
        names.insert(def.id(), name);
    }

    Ok(DefinitionIndex { by_id, names })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_definitions(
    definitions: &[RecordDefinition],
    index: &DefinitionIndex<'_>,
) -> Result<(), ValidationError> {
    for def in definitions {
        if def.fields().is_empty() {
            return Err(ValidationError::EmptyDefinition {
                definition: def.id().to_string(),
            });
        }

        if let Some(parent) = def.parent() {
            if index.get(parent).is_none() {
                return Err(ValidationError::UnknownParent {
                    definition: def.id().to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        for (name, descriptor) in def.fields() {
            validate_field_name(def, name)?;
            if let FieldKind::Record(target) = &descriptor.kind {
                if index.get(target).is_none() {
                    return Err(ValidationError::UnsupportedFieldKind {
                        definition: def.id().to_string(),
                        field: name.clone(),
                        reason: format!(
                            "references '{target}', which is not part of the compiled set"
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}

fn validate_field_name(def: &RecordDefinition, name: &str) -> Result<(), ValidationError> {
    let reject = |reason: String| ValidationError::UnsupportedFieldKind {
        definition: def.id().to_string(),
        field: name.to_string(),
        reason,
    };
    if !is_identifier(name) {
        return Err(reject("field names must be ASCII identifiers".to_string()));
    }
    // Decoded records are keyed by the JSON name of the schema field, so the
    // declared name must come back unchanged.
    let key = json_name(&camel_to_snake(name));
    if key != name {
        return Err(reject(format!(
            "field name does not survive the protobuf JSON mapping; declare it as '{key}'"
        )));
    }
    Ok(())
}

/// Depth-first search over parent links and record references.
fn detect_cycles(
    definitions: &[RecordDefinition],
    index: &DefinitionIndex<'_>,
) -> Result<(), ValidationError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn edges(def: &RecordDefinition) -> impl Iterator<Item = &RecordId> {
        def.parent()
            .into_iter()
            .chain(def.fields().iter().filter_map(|(_, d)| match &d.kind {
                FieldKind::Record(target) => Some(target),
                _ => None,
            }))
    }

    fn visit<'a>(
        def: &'a RecordDefinition,
        index: &DefinitionIndex<'a>,
        marks: &mut HashMap<&'a RecordId, Mark>,
        path: &mut Vec<&'a RecordId>,
    ) -> Result<(), ValidationError> {
        match marks.get(def.id()) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|id| *id == def.id()).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|id| id.to_string()).collect();
                cycle.push(def.id().to_string());
                return Err(ValidationError::CyclicReference { cycle });
            }
            None => {}
        }

        marks.insert(def.id(), Mark::Visiting);
        path.push(def.id());
        for target in edges(def) {
            if let Some(next) = index.get(target) {
                visit(next, index, marks, path)?;
            }
        }
        path.pop();
        marks.insert(def.id(), Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut path = Vec::new();
    for def in definitions {
        visit(def, index, &mut marks, &mut path)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Ancestors of `def`, root-most first. The parent graph is acyclic by the
/// time this runs.
fn ancestors<'a>(def: &'a RecordDefinition, index: &DefinitionIndex<'a>) -> Vec<&'a RecordDefinition> {
    let mut chain = Vec::new();
    let mut current = def.parent().and_then(|p| index.get(p));
    while let Some(ancestor) = current {
        chain.push(ancestor);
        current = ancestor.parent().and_then(|p| index.get(p));
    }
    chain.reverse();
    chain
}

fn lay_out(
    def: &RecordDefinition,
    index: &DefinitionIndex<'_>,
) -> Result<Vec<LaidOutField>, ValidationError> {
    let tag = RegisteredField::type_tag();
    let mut layout = vec![LaidOutField {
        name: tag.name,
        proto_name: tag.proto_name,
        number: tag.number,
        type_name: tag.type_name,
        repeated: tag.repeated,
        import: None,
    }];

    // record key → definition that declared it
    let mut declared_by: BTreeMap<String, String> = BTreeMap::new();
    declared_by.insert(TYPE_FIELD.to_string(), "implicit type tag".to_string());

    let chain = ancestors(def, index);
    for owner in chain.into_iter().chain(std::iter::once(def)) {
        for (name, descriptor) in owner.fields() {
            let proto_name = camel_to_snake(name);
            if let Some(first) = declared_by.get(name) {
                return Err(ValidationError::FieldRedefinition {
                    definition: owner.id().to_string(),
                    field: name.clone(),
                    declared_by: first.clone(),
                });
            }
            declared_by.insert(name.clone(), owner.id().to_string());

            let number = layout.len() as u32 + 1;
            layout.push(LaidOutField {
                name: json_name(&proto_name),
                proto_name,
                number,
                type_name: schema_type_name(descriptor, index),
                repeated: descriptor.repeated,
                import: descriptor.import_path(),
            });
        }
    }

    Ok(layout)
}

fn schema_type_name(descriptor: &FieldDescriptor, index: &DefinitionIndex<'_>) -> String {
    match &descriptor.kind {
        FieldKind::Scalar(kind) => kind.as_str().to_string(),
        FieldKind::WellKnown(kind) => kind.type_name().to_string(),
        FieldKind::Record(target) => index.message_name(target).to_string(),
    }
}
