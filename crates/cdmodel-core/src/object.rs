//! Serializable object base
//!
//! Every model type is constructible empty, populated from a parsed JSON value,
//! and turned back into a JSON value. The helpers here keep field access and
//! error contexts uniform across the hand-written implementations.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{JsonShape, ModelError};
use crate::reference::{NamedReferenceOrDefinition, Referenceable};

/// Contract shared by every model object
pub trait JsonObject: Sized + Default {
    /// Name of the object kind, used as the root of error contexts
    const KIND: &'static str;

    /// Populate from a JSON value, reporting errors under `context`
    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError>;

    /// Populate from a JSON value
    fn from_json(value: &Value) -> Result<Self, ModelError> {
        Self::from_json_at(value, Self::KIND)
    }

    /// Produce the JSON value for this object. Never fails.
    fn to_json(&self) -> Value;
}

/// Parse a serde-derived record, requiring an object
pub(crate) fn record_from_json<T: DeserializeOwned>(
    value: &Value,
    context: &str,
) -> Result<T, ModelError> {
    if !value.is_object() {
        return Err(ModelError::unexpected_shape(context, JsonShape::Object, value));
    }

    serde_json::from_value(value.clone()).map_err(|e| ModelError::MalformedDocument {
        context: context.to_string(),
        message: e.to_string(),
    })
}

/// Serialize a serde-derived record
///
/// # Panics
///
/// If `T` has a field serde_json cannot represent (a non-string map key or a
/// failing `Serialize` impl). Records hold only strings, numbers, bools and JSON values.
pub(crate) fn record_to_json<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).expect("record fields are always representable as JSON")
}

/// Read-side view over one JSON object with a context path for errors
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
    context: &'a str,
}

impl<'a> Fields<'a> {
    /// Require `value` to be an object
    pub fn of(value: &'a Value, context: &'a str) -> Result<Self, ModelError> {
        match value {
            Value::Object(map) => Ok(Self { map, context }),
            other => Err(ModelError::unexpected_shape(context, JsonShape::Object, other)),
        }
    }

    /// Context path for a child field
    pub fn path(&self, key: &str) -> String {
        format!("{}.{}", self.context, key)
    }

    /// Raw access; a JSON `null` counts as absent
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// A string field that must be present and non-empty
    pub fn required_str(&self, key: &str) -> Result<String, ModelError> {
        match self.optional_str(key)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(ModelError::missing_field(self.context, key)),
        }
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<String>, ModelError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ModelError::unexpected_shape(self.path(key), JsonShape::String, other)),
        }
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, ModelError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(ModelError::unexpected_shape(self.path(key), JsonShape::Bool, other)),
        }
    }

    /// An array field; absent means empty
    pub fn array(&self, key: &str) -> Result<&'a [Value], ModelError> {
        match self.get(key) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(other) => Err(ModelError::unexpected_shape(self.path(key), JsonShape::Array, other)),
        }
    }

    pub fn string_array(&self, key: &str) -> Result<Vec<String>, ModelError> {
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ModelError::unexpected_shape(
                    format!("{}[{}]", self.path(key), i),
                    JsonShape::String,
                    other,
                )),
            })
            .collect()
    }

    /// An array of nested objects
    pub fn objects<T: JsonObject>(&self, key: &str) -> Result<Vec<T>, ModelError> {
        let base = self.path(key);
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_json_at(item, &format!("{}[{}]", base, i)))
            .collect()
    }

    /// An optional name-or-definition field; absent or null means empty
    pub fn optional_reference<T: Referenceable>(
        &self,
        key: &str,
    ) -> Result<Option<NamedReferenceOrDefinition<T>>, ModelError> {
        self.get(key)
            .map(|value| NamedReferenceOrDefinition::parse(value, &self.path(key)))
            .transpose()
    }

    /// An array of name-or-definition entries
    pub fn references<T: Referenceable>(
        &self,
        key: &str,
    ) -> Result<Vec<NamedReferenceOrDefinition<T>>, ModelError> {
        let base = self.path(key);
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(i, item)| NamedReferenceOrDefinition::parse(item, &format!("{}[{}]", base, i)))
            .collect()
    }
}

/// Write-side builder that omits absent optionals and empty arrays
#[derive(Default)]
pub(crate) struct ObjectBuilder {
    map: Map<String, Value>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, key: &str, value: Value) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn str(self, key: &str, value: &str) -> Self {
        self.value(key, Value::String(value.to_string()))
    }

    pub fn opt_str(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(s) => self.str(key, s),
            None => self,
        }
    }

    pub fn opt_bool(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(b) => self.value(key, Value::Bool(b)),
            None => self,
        }
    }

    pub fn opt_value(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.value(key, v),
            None => self,
        }
    }

    pub fn array<I>(self, key: &str, items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        if items.is_empty() {
            self
        } else {
            self.value(key, Value::Array(items))
        }
    }

    pub fn strings(self, key: &str, items: &[String]) -> Self {
        self.array(key, items.iter().cloned().map(Value::String))
    }

    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}
