//! Entity variants
//!
//! An entity is either defined locally, owning its attributes and partitions,
//! or referenced from another model. The variant set is closed and chosen by
//! the `$type` discriminator.

use std::collections::HashSet;

use serde_json::Value;

use crate::attribute::Attribute;
use crate::error::ModelError;
use crate::import::Import;
use crate::object::{Fields, JsonObject, ObjectBuilder};
use crate::partition::Partition;
use crate::reference::NamedReferenceOrDefinition;
use crate::traits::TraitReference;

const LOCAL_ENTITY_TYPE: &str = "LocalEntity";
const REFERENCE_ENTITY_TYPE: &str = "ReferenceEntity";

/// Fields shared by every entity variant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityHeader {
    pub name: String,
    pub description: Option<String>,
    pub is_hidden: Option<bool>,
    pub exhibits_traits: Vec<NamedReferenceOrDefinition<TraitReference>>,
}

impl EntityHeader {
    fn read(fields: &Fields<'_>) -> Result<Self, ModelError> {
        Ok(Self {
            name: fields.required_str("name")?,
            description: fields.optional_str("description")?,
            is_hidden: fields.optional_bool("isHidden")?,
            exhibits_traits: fields.references("exhibitsTraits")?,
        })
    }

    fn write(&self, entity_type: &str) -> ObjectBuilder {
        ObjectBuilder::new()
            .str("$type", entity_type)
            .str("name", &self.name)
            .opt_str("description", self.description.as_deref())
            .opt_bool("isHidden", self.is_hidden)
            .array("exhibitsTraits", self.exhibits_traits.iter().map(|t| t.to_json()))
    }
}

/// Reject a `$type` that names a different variant; a missing one is accepted
fn check_type(fields: &Fields<'_>, expected: &str) -> Result<(), ModelError> {
    match fields.optional_str("$type")? {
        Some(found) if found != expected => Err(ModelError::MalformedDocument {
            context: fields.path("$type"),
            message: format!("expected '{}', found '{}'", expected, found),
        }),
        _ => Ok(()),
    }
}

/// An entity defined in the current model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalEntity {
    pub header: EntityHeader,
    pub attributes: Vec<Attribute>,
    pub partitions: Vec<Partition>,
    pub schemas: Vec<String>,
    pub imports: Vec<Import>,
}

impl LocalEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: EntityHeader {
                name: name.into(),
                ..EntityHeader::default()
            },
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Find an attribute by name
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute names in declaration order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Check attribute name uniqueness
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(ModelError::DuplicateAttribute {
                    entity: self.header.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl JsonObject for LocalEntity {
    const KIND: &'static str = "entity";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;
        check_type(&fields, LOCAL_ENTITY_TYPE)?;

        let entity = Self {
            header: EntityHeader::read(&fields)?,
            attributes: fields.objects("attributes")?,
            partitions: fields.objects("partitions")?,
            schemas: fields.string_array("schemas")?,
            imports: fields.objects("imports")?,
        };

        entity.validate()?;
        tracing::debug!(
            entity = %entity.header.name,
            attributes = entity.attributes.len(),
            partitions = entity.partitions.len(),
            "parsed local entity"
        );

        Ok(entity)
    }

    fn to_json(&self) -> Value {
        self.header
            .write(LOCAL_ENTITY_TYPE)
            .array("attributes", self.attributes.iter().map(Attribute::to_json))
            .array("partitions", self.partitions.iter().map(Partition::to_json))
            .strings("schemas", &self.schemas)
            .array("imports", self.imports.iter().map(Import::to_json))
            .build()
    }
}

/// An entity defined in another model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceEntity {
    pub header: EntityHeader,

    /// Name of the entity in the referenced model
    pub source: String,

    pub model_id: Option<String>,
}

impl ReferenceEntity {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            header: EntityHeader {
                name: name.into(),
                ..EntityHeader::default()
            },
            source: source.into(),
            model_id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }
}

impl JsonObject for ReferenceEntity {
    const KIND: &'static str = "entity";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;
        check_type(&fields, REFERENCE_ENTITY_TYPE)?;

        Ok(Self {
            header: EntityHeader::read(&fields)?,
            source: fields.required_str("source")?,
            model_id: fields.optional_str("modelId")?,
        })
    }

    fn to_json(&self) -> Value {
        self.header
            .write(REFERENCE_ENTITY_TYPE)
            .str("source", &self.source)
            .opt_str("modelId", self.model_id.as_deref())
            .build()
    }
}

/// Closed set of entity variants
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Local(LocalEntity),
    Referenced(ReferenceEntity),
}

impl Default for Entity {
    fn default() -> Self {
        Self::Local(LocalEntity::default())
    }
}

impl Entity {
    pub fn header(&self) -> &EntityHeader {
        match self {
            Self::Local(entity) => &entity.header,
            Self::Referenced(entity) => &entity.header,
        }
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    /// The `$type` discriminator for this variant
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Local(_) => LOCAL_ENTITY_TYPE,
            Self::Referenced(_) => REFERENCE_ENTITY_TYPE,
        }
    }

    pub fn as_local(&self) -> Option<&LocalEntity> {
        match self {
            Self::Local(entity) => Some(entity),
            Self::Referenced(_) => None,
        }
    }

    pub fn as_referenced(&self) -> Option<&ReferenceEntity> {
        match self {
            Self::Local(_) => None,
            Self::Referenced(entity) => Some(entity),
        }
    }
}

impl JsonObject for Entity {
    const KIND: &'static str = "entity";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;

        match fields.optional_str("$type")?.as_deref() {
            Some(LOCAL_ENTITY_TYPE) => Ok(Self::Local(LocalEntity::from_json_at(value, context)?)),
            Some(REFERENCE_ENTITY_TYPE) => Ok(Self::Referenced(ReferenceEntity::from_json_at(value, context)?)),
            Some(other) => Err(ModelError::MalformedDocument {
                context: fields.path("$type"),
                message: format!("unknown entity type '{}'", other),
            }),
            None => Err(ModelError::missing_field(context, "$type")),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Local(entity) => entity.to_json(),
            Self::Referenced(entity) => entity.to_json(),
        }
    }
}

impl From<LocalEntity> for Entity {
    fn from(entity: LocalEntity) -> Self {
        Self::Local(entity)
    }
}

impl From<ReferenceEntity> for Entity {
    fn from(entity: ReferenceEntity) -> Self {
        Self::Referenced(entity)
    }
}
