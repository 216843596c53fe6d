//! # Type Registry
//!
//! Maps message names to their parent, field map and constructor. The
//! predictive decoder uses it to turn a recovered type tag into a fresh,
//! default-valued record of the right variant.
//!
//! Registries are built once, by the schema compiler or by a caller
//! registering variants up front through [`TypeRegistry::builder`], and are
//! immutable afterwards. Cloning shares the underlying map.

use std::collections::BTreeMap;
use std::sync::Arc;

use protospark_core::{Record, ScalarKind, BASE_MESSAGE_TYPE, TYPE_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Factory producing a fresh record of one variant.
pub type Constructor = Arc<dyn Fn() -> Record + Send + Sync>;

/// One field in a registered message's field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredField {
    /// Record key (lowerCamelCase).
    pub name: String,
    /// Field name in the schema document (snake_case).
    pub proto_name: String,
    /// Field number.
    pub number: u32,
    /// Type as written in the schema document.
    pub type_name: String,
    /// Whether the field is repeated.
    pub repeated: bool,
}

impl RegisteredField {
    /// The implicit `string type = 1` field.
    pub fn type_tag() -> Self {
        Self {
            name: TYPE_FIELD.to_string(),
            proto_name: TYPE_FIELD.to_string(),
            number: 1,
            type_name: ScalarKind::String.as_str().to_string(),
            repeated: false,
        }
    }

    /// The value a freshly constructed record holds for this field.
    ///
    /// Scalars take their proto3 default and repeated fields an empty list.
    /// Message-typed fields have no default: the runtime omits them when
    /// unset, so a fresh record leaves them out too.
    pub fn default_value(&self) -> Option<Value> {
        if self.repeated {
            return Some(Value::Array(Vec::new()));
        }
        match ScalarKind::from_keyword(&self.type_name)? {
            ScalarKind::Bool => Some(Value::Bool(false)),
            ScalarKind::String | ScalarKind::Bytes => Some(Value::String(String::new())),
            ScalarKind::Double | ScalarKind::Float => Some(Value::from(0.0)),
            _ => Some(Value::from(0)),
        }
    }
}

/// A message variant known to the registry.
#[derive(Clone)]
pub struct RegisteredType {
    name: String,
    parent: String,
    fields: Vec<RegisteredField>,
    constructor: Option<Constructor>,
}

impl RegisteredType {
    /// A variant with the base message as parent and no known fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: BASE_MESSAGE_TYPE.to_string(),
            fields: Vec::new(),
            constructor: None,
        }
    }

    /// Set the parent message name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    /// Append a field to the field map.
    pub fn with_field(mut self, field: RegisteredField) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the default constructor.
    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Record + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    /// Message name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent message name ([`BASE_MESSAGE_TYPE`] when there is none).
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Field map, including the implicit `type` field when known.
    pub fn fields(&self) -> &[RegisteredField] {
        &self.fields
    }

    /// Look up a field by record key.
    pub fn field(&self, name: &str) -> Option<&RegisteredField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Produce a fresh record of this variant with `type` set.
    ///
    /// Uses the registered constructor when there is one, otherwise fills
    /// every field that has a [default](RegisteredField::default_value).
    pub fn instantiate(&self) -> Record {
        let mut record = match &self.constructor {
            Some(ctor) => ctor(),
            None => {
                let mut record = Record::new();
                for field in &self.fields {
                    if let Some(value) = field.default_value() {
                        record.insert(field.name.clone(), value);
                    }
                }
                record
            }
        };
        record.set_type(self.name.clone());
        record
    }
}

impl std::fmt::Debug for RegisteredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredType")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .field("custom_constructor", &self.constructor.is_some())
            .finish()
    }
}

/// Immutable mapping from message name to [`RegisteredType`].
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Arc<BTreeMap<String, RegisteredType>>,
}

impl TypeRegistry {
    /// Start assembling a registry.
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Look up a variant by message name.
    pub fn get(&self, name: &str) -> Option<&RegisteredType> {
        self.types.get(name)
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered message names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Iterate over registered variants in name order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredType> {
        self.types.values()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Builder for [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    types: BTreeMap<String, RegisteredType>,
}

impl TypeRegistryBuilder {
    /// Register a variant, replacing any earlier one with the same name.
    pub fn register(mut self, registered: RegisteredType) -> Self {
        self.types.insert(registered.name.clone(), registered);
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            types: Arc::new(self.types),
        }
    }
}

impl FromIterator<RegisteredType> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = RegisteredType>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::builder(), TypeRegistryBuilder::register)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, number: u32, type_name: &str, repeated: bool) -> RegisteredField {
        RegisteredField {
            name: name.into(),
            proto_name: protospark_core::camel_to_snake(name),
            number,
            type_name: type_name.into(),
            repeated,
        }
    }

    #[test]
    fn test_default_instantiation() {
        let t = RegisteredType::new("TestMessage")
            .with_field(RegisteredField::type_tag())
            .with_field(field("testParamString", 2, "string", false))
            .with_field(field("testParamBool", 3, "bool", false))
            .with_field(field("counts", 4, "int64", true))
            .with_field(field("when", 5, "google.protobuf.Timestamp", false));
        let record = t.instantiate();
        assert_eq!(
            record.into_value(),
            json!({
                "type": "TestMessage",
                "testParamString": "",
                "testParamBool": false,
                "counts": []
            })
        );
        assert_eq!(t.parent(), BASE_MESSAGE_TYPE);
        assert_eq!(t.field("when").unwrap().default_value(), None);
    }

    #[test]
    fn test_custom_constructor_gets_type_stamped() {
        let t = RegisteredType::new("CorrectMessage")
            .with_constructor(|| Record::new().with("someField", "preset"));
        let record = t.instantiate();
        assert_eq!(record.type_name(), Some("CorrectMessage"));
        assert_eq!(record.get("someField"), Some(&json!("preset")));
    }

    #[test]
    fn test_registry_lookup_and_sharing() {
        let registry: TypeRegistry = vec![
            RegisteredType::new("B").with_parent("A"),
            RegisteredType::new("A"),
        ]
        .into_iter()
        .collect();
        let shared = registry.clone();
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(shared.get("B").map(|t| t.parent()), Some("A"));
        assert!(!shared.contains("C"));
    }
}
