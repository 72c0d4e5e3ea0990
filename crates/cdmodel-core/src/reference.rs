//! Name-or-definition references
//!
//! A reference field holds either a bare name pointing at a definition elsewhere
//! or the definition itself, inline. The decision is made per field from the
//! JSON shape alone.

use serde_json::Value;

use crate::error::{JsonShape, ModelError};
use crate::object::JsonObject;

/// A model type that can be named from a reference field
pub trait Referenceable: JsonObject {
    /// The name a bare reference to this object would use
    fn reference_name(&self) -> &str;
}

/// Either a bare name or an inline definition
#[derive(Debug, Clone, PartialEq)]
pub enum NamedReferenceOrDefinition<T> {
    /// Bare name, kept verbatim
    Name(String),

    /// Inline definition
    Definition(Box<T>),
}

impl<T: Referenceable> NamedReferenceOrDefinition<T> {
    /// Create a bare name reference
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create an inline definition
    pub fn defined(definition: T) -> Self {
        Self::Definition(Box::new(definition))
    }

    /// Decide the arm from the JSON shape of `value`
    ///
    /// Strings become names, objects are parsed as `T`, anything else fails
    /// with `InvalidReferenceShape` naming `field`.
    pub fn parse(value: &Value, field: &str) -> Result<Self, ModelError> {
        match value {
            Value::String(name) => Ok(Self::Name(name.clone())),
            Value::Object(_) => Ok(Self::Definition(Box::new(T::from_json_at(value, field)?))),
            other => Err(ModelError::InvalidReferenceShape {
                field: field.to_string(),
                shape: JsonShape::of(other),
            }),
        }
    }

    /// Names serialize as strings, definitions as nested objects
    pub fn to_json(&self) -> Value {
        match self {
            Self::Name(name) => Value::String(name.clone()),
            Self::Definition(definition) => definition.to_json(),
        }
    }

    /// The referenced name, whichever arm is populated
    pub fn referenced_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Definition(definition) => definition.reference_name(),
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Definition(_) => None,
        }
    }

    pub fn as_definition(&self) -> Option<&T> {
        match self {
            Self::Name(_) => None,
            Self::Definition(definition) => Some(definition),
        }
    }

    pub fn is_name(&self) -> bool {
        matches!(self, Self::Name(_))
    }

    pub fn is_definition(&self) -> bool {
        matches!(self, Self::Definition(_))
    }
}

impl<T> From<&str> for NamedReferenceOrDefinition<T> {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}
