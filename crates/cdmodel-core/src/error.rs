//! Model error taxonomy
//!
//! Every failure raised while reading or resolving a document is one of these.
//! Parsing is deterministic, so nothing here is retried or recovered from.

use serde_json::Value;

/// Shape of a JSON value, used when reporting what was found instead of what was expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonShape {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonShape {
    /// Classify a JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for JsonShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by `from_json` and by inheritance resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Wrong JSON shape at a required-object field, or a missing/empty required field
    #[error("Malformed document at {context}: {message}")]
    MalformedDocument { context: String, message: String },

    /// A reference field holds neither a string nor an object
    #[error("Invalid reference at {field}: expected a name or an object, found {shape}")]
    InvalidReferenceShape { field: String, shape: JsonShape },

    /// Two attributes of one entity share a name
    #[error("Duplicate attribute '{attribute}' in entity '{entity}'")]
    DuplicateAttribute { entity: String, attribute: String },

    /// An extends chain revisits a definition
    #[error("Cyclic inheritance: {}", cycle.join(" -> "))]
    CyclicInheritance { cycle: Vec<String> },

    /// A named reference has no definition in the lookup
    #[error("Unresolved {kind} reference '{name}'")]
    UnresolvedReference { kind: &'static str, name: String },

    /// Two definitions of one kind share a name within a document
    #[error("Duplicate {kind} definition '{name}'")]
    DuplicateDefinition { kind: &'static str, name: String },
}

impl ModelError {
    /// A value had the wrong shape where a specific one was required
    pub fn unexpected_shape(context: impl Into<String>, expected: JsonShape, found: &Value) -> Self {
        Self::MalformedDocument {
            context: context.into(),
            message: format!("expected {}, found {}", expected, JsonShape::of(found)),
        }
    }

    /// A required field is absent or empty
    pub fn missing_field(context: impl Into<String>, field: &str) -> Self {
        Self::MalformedDocument {
            context: context.into(),
            message: format!("required field '{}' is missing or empty", field),
        }
    }
}

/// Errors raised while loading or saving a whole document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read document file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse document JSON: {0}")]
    ParseError(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
