//! Attribute records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::object::{record_from_json, record_to_json, JsonObject};

/// Data type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Unclassified,
    String,
    Int64,
    Double,
    DateTime,
    DateTimeOffset,
    Decimal,
    Boolean,
    Guid,
    Json,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclassified => write!(f, "unclassified"),
            Self::String => write!(f, "string"),
            Self::Int64 => write!(f, "int64"),
            Self::Double => write!(f, "double"),
            Self::DateTime => write!(f, "dateTime"),
            Self::DateTimeOffset => write!(f, "dateTimeOffset"),
            Self::Decimal => write!(f, "decimal"),
            Self::Boolean => write!(f, "boolean"),
            Self::Guid => write!(f, "guid"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// A column-like field of a local entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Attribute name, unique within its entity
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<u32>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type),
            ..Self::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = Some(nullable);
        self
    }

    pub fn with_maximum_length(mut self, maximum_length: u32) -> Self {
        self.maximum_length = Some(maximum_length);
        self
    }
}

impl JsonObject for Attribute {
    const KIND: &'static str = "attribute";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let attribute: Attribute = record_from_json(value, context)?;
        if attribute.name.is_empty() {
            return Err(ModelError::missing_field(context, "name"));
        }
        Ok(attribute)
    }

    fn to_json(&self) -> Value {
        record_to_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_attribute() {
        let value = json!({ "name": "createdOn", "dataType": "dateTimeOffset", "isNullable": false });
        let attribute = Attribute::from_json(&value).unwrap();
        assert_eq!(attribute.data_type, Some(DataType::DateTimeOffset));
        assert_eq!(attribute.data_type.unwrap().to_string(), "dateTimeOffset");
        assert_eq!(attribute.to_json(), value);
    }

    #[test]
    fn unknown_data_type_is_malformed() {
        let err = Attribute::from_json(&json!({ "name": "x", "dataType": "varchar" })).unwrap_err();
        assert!(matches!(err, ModelError::MalformedDocument { .. }));
    }

    #[test]
    fn empty_name_is_malformed() {
        let err = Attribute::from_json(&json!({ "name": "" })).unwrap_err();
        assert_eq!(err, ModelError::missing_field("attribute", "name"));
    }
}
