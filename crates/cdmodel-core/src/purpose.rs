//! Purposes: named, inheritable units that exhibit traits

use serde_json::Value;

use crate::error::ModelError;
use crate::object::{Fields, JsonObject, ObjectBuilder};
use crate::reference::{NamedReferenceOrDefinition, Referenceable};
use crate::traits::TraitReference;

/// A purpose definition
///
/// `extends_purpose` forms a single-parent chain. The fields are never mutated
/// by resolution; see [`crate::resolve::resolve_purpose`] for the effective
/// trait set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Purpose {
    pub explanation: Option<String>,
    pub purpose_name: String,
    pub extends_purpose: Option<NamedReferenceOrDefinition<Purpose>>,
    pub exhibits_traits: Vec<NamedReferenceOrDefinition<TraitReference>>,
}

impl Purpose {
    pub fn new(purpose_name: impl Into<String>) -> Self {
        Self {
            purpose_name: purpose_name.into(),
            ..Self::default()
        }
    }

    /// Set the parent purpose
    pub fn extending(mut self, parent: NamedReferenceOrDefinition<Purpose>) -> Self {
        self.extends_purpose = Some(parent);
        self
    }

    /// Append an exhibited trait
    pub fn exhibiting(mut self, trait_ref: NamedReferenceOrDefinition<TraitReference>) -> Self {
        self.exhibits_traits.push(trait_ref);
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

impl JsonObject for Purpose {
    const KIND: &'static str = "purpose";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;

        Ok(Self {
            explanation: fields.optional_str("explanation")?,
            purpose_name: fields.required_str("purposeName")?,
            extends_purpose: fields.optional_reference("extendsPurpose")?,
            exhibits_traits: fields.references("exhibitsTraits")?,
        })
    }

    fn to_json(&self) -> Value {
        ObjectBuilder::new()
            .opt_str("explanation", self.explanation.as_deref())
            .str("purposeName", &self.purpose_name)
            .opt_value("extendsPurpose", self.extends_purpose.as_ref().map(|r| r.to_json()))
            .array("exhibitsTraits", self.exhibits_traits.iter().map(|t| t.to_json()))
            .build()
    }
}

impl Referenceable for Purpose {
    fn reference_name(&self) -> &str {
        &self.purpose_name
    }
}
