//! # Dynamic Records
//!
//! A [`Record`] is the value the codec encodes and decodes: a JSON object
//! with lowerCamelCase field keys and a string `type` member naming the
//! message. Records convert to and from any `serde` type, so callers can
//! keep statically typed structs at the edges:
//!
//! ```
//! use protospark_core::Record;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! #[serde(rename_all = "camelCase")]
//! struct Greeting {
//!     #[serde(rename = "type")]
//!     kind: String,
//!     some_field: String,
//! }
//!
//! let g = Greeting { kind: "CorrectMessage".into(), some_field: "hello".into() };
//! let record = Record::from_serialize(&g).unwrap();
//! assert_eq!(record.type_name(), Some("CorrectMessage"));
//! let back: Greeting = record.into_typed().unwrap();
//! assert_eq!(back, g);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::naming::TYPE_FIELD;

/// A dynamic message value keyed by lowerCamelCase field name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// An empty record with no type tag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// An empty record tagged with `type_name`.
    pub fn of_type(type_name: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.set_type(type_name);
        record
    }

    /// Convert any serializable value into a record.
    ///
    /// Fails if the value does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(serde::de::Error::invalid_type(
                unexpected(&other),
                &"a JSON object",
            )),
        }
    }

    /// Deserialize the record into a typed value.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0))
    }

    /// The `type` tag, if present and a non-empty string.
    pub fn type_name(&self) -> Option<&str> {
        self.0
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Overwrite the `type` tag.
    pub fn set_type(&mut self, type_name: impl Into<String>) {
        self.0
            .insert(TYPE_FIELD.to_string(), Value::String(type_name.into()));
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Read a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Remove a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Number of fields, including `type`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Take the record as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl TryFrom<Value> for Record {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl Extend<(String, Value)> for Record {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn unexpected(value: &Value) -> serde::de::Unexpected<'_> {
    use serde::de::Unexpected;
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_name_requires_non_empty_string() {
        assert_eq!(Record::new().type_name(), None);
        assert_eq!(Record::new().with("type", "").type_name(), None);
        assert_eq!(Record::new().with("type", 7).type_name(), None);
        assert_eq!(Record::of_type("X").type_name(), Some("X"));
    }

    #[test]
    fn test_set_type_overwrites() {
        let mut r = Record::of_type("A").with("someField", "hello");
        r.set_type("B");
        assert_eq!(r.type_name(), Some("B"));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Record::from_value(json!([1, 2])).is_err());
        assert!(Record::from_value(json!("str")).is_err());
        let r = Record::from_value(json!({"type": "X"})).unwrap();
        assert_eq!(r.type_name(), Some("X"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let r = Record::of_type("X").with("someField", "hello");
        let text = serde_json::to_string(&r).unwrap();
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back, r);
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"type": "X", "someField": "hello"})
        );
    }
}
