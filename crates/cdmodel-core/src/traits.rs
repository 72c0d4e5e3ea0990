//! Trait references and trait definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::object::{record_from_json, record_to_json, Fields, JsonObject, ObjectBuilder};
use crate::reference::{NamedReferenceOrDefinition, Referenceable};

/// One argument passed to a trait
///
/// In JSON an argument is either a bare value (positional) or an object with a
/// `value` key and optional `name` and `explanation`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraitArgument {
    pub name: Option<String>,
    pub explanation: Option<String>,
    pub value: Value,
}

impl TraitArgument {
    /// A named argument
    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            explanation: None,
            value,
        }
    }

    /// A positional argument
    pub fn positional(value: Value) -> Self {
        Self {
            name: None,
            explanation: None,
            value,
        }
    }

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        match value {
            Value::Object(map) if map.contains_key("value") => {
                let fields = Fields::of(value, context)?;
                Ok(Self {
                    name: fields.optional_str("name")?,
                    explanation: fields.optional_str("explanation")?,
                    value: map.get("value").cloned().unwrap_or(Value::Null),
                })
            }
            other => Ok(Self::positional(other.clone())),
        }
    }

    fn to_json(&self) -> Value {
        let needs_wrapper = self.name.is_some()
            || self.explanation.is_some()
            || matches!(&self.value, Value::Object(map) if map.contains_key("value"));

        if !needs_wrapper {
            return self.value.clone();
        }

        ObjectBuilder::new()
            .opt_str("name", self.name.as_deref())
            .opt_str("explanation", self.explanation.as_deref())
            .value("value", self.value.clone())
            .build()
    }
}

/// Application of a trait, optionally carrying arguments
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraitReference {
    pub trait_name: String,
    pub arguments: Vec<TraitArgument>,
}

impl TraitReference {
    pub fn new(trait_name: impl Into<String>) -> Self {
        Self {
            trait_name: trait_name.into(),
            arguments: Vec::new(),
        }
    }

    /// Append an argument
    pub fn with_argument(mut self, argument: TraitArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Value of a named argument
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| &a.value)
    }
}

impl JsonObject for TraitReference {
    const KIND: &'static str = "traitReference";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;
        let base = fields.path("arguments");

        let arguments = fields
            .array("arguments")?
            .iter()
            .enumerate()
            .map(|(i, item)| TraitArgument::from_json_at(item, &format!("{}[{}]", base, i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trait_name: fields.required_str("traitName")?,
            arguments,
        })
    }

    fn to_json(&self) -> Value {
        ObjectBuilder::new()
            .str("traitName", &self.trait_name)
            .array("arguments", self.arguments.iter().map(TraitArgument::to_json))
            .build()
    }
}

impl Referenceable for TraitReference {
    fn reference_name(&self) -> &str {
        &self.trait_name
    }
}

/// A parameter declared by a trait definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

impl JsonObject for Parameter {
    const KIND: &'static str = "parameter";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let parameter: Parameter = record_from_json(value, context)?;
        if parameter.name.is_empty() {
            return Err(ModelError::missing_field(context, "name"));
        }
        Ok(parameter)
    }

    fn to_json(&self) -> Value {
        record_to_json(self)
    }
}

/// Definition of a trait, inheritable through `extendsTrait`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraitDefinition {
    pub trait_name: String,
    pub explanation: Option<String>,
    pub extends_trait: Option<NamedReferenceOrDefinition<TraitDefinition>>,
    pub has_parameters: Vec<Parameter>,
    pub elevated: Option<bool>,
    pub ugly: Option<bool>,
    pub associated_properties: Vec<String>,
}

impl TraitDefinition {
    pub fn new(trait_name: impl Into<String>) -> Self {
        Self {
            trait_name: trait_name.into(),
            ..Self::default()
        }
    }

    pub fn extending(mut self, parent: NamedReferenceOrDefinition<TraitDefinition>) -> Self {
        self.extends_trait = Some(parent);
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.has_parameters.push(parameter);
        self
    }
}

impl JsonObject for TraitDefinition {
    const KIND: &'static str = "trait";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;

        Ok(Self {
            trait_name: fields.required_str("traitName")?,
            explanation: fields.optional_str("explanation")?,
            extends_trait: fields.optional_reference("extendsTrait")?,
            has_parameters: fields.objects("hasParameters")?,
            elevated: fields.optional_bool("elevated")?,
            ugly: fields.optional_bool("ugly")?,
            associated_properties: fields.string_array("associatedProperties")?,
        })
    }

    fn to_json(&self) -> Value {
        ObjectBuilder::new()
            .str("traitName", &self.trait_name)
            .opt_str("explanation", self.explanation.as_deref())
            .opt_value("extendsTrait", self.extends_trait.as_ref().map(|r| r.to_json()))
            .array("hasParameters", self.has_parameters.iter().map(Parameter::to_json))
            .opt_bool("elevated", self.elevated)
            .opt_bool("ugly", self.ugly)
            .strings("associatedProperties", &self.associated_properties)
            .build()
    }
}

impl Referenceable for TraitDefinition {
    fn reference_name(&self) -> &str {
        &self.trait_name
    }
}
