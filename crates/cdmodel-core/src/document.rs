//! Schema documents
//!
//! A document is the unit that gets loaded and saved: its imports plus an
//! ordered list of definitions. It is also the same-document index that
//! resolution looks names up in.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::entity::Entity;
use crate::error::{DocumentError, ModelError};
use crate::import::Import;
use crate::object::{Fields, JsonObject, ObjectBuilder};
use crate::purpose::Purpose;
use crate::resolve::{self, DefinitionLookup, EffectiveParameters, EffectiveTraits};
use crate::traits::TraitDefinition;

/// One top-level definition, discriminated by which name field it carries
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Purpose(Purpose),
    Trait(TraitDefinition),
    Entity(Entity),
}

impl Default for Definition {
    fn default() -> Self {
        Self::Purpose(Purpose::default())
    }
}

impl Definition {
    /// Kind label used in messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Purpose(_) => Purpose::KIND,
            Self::Trait(_) => TraitDefinition::KIND,
            Self::Entity(_) => Entity::KIND,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Purpose(purpose) => &purpose.purpose_name,
            Self::Trait(definition) => &definition.trait_name,
            Self::Entity(entity) => entity.name(),
        }
    }
}

impl JsonObject for Definition {
    const KIND: &'static str = "definition";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;

        if fields.contains("purposeName") {
            Ok(Self::Purpose(Purpose::from_json_at(value, context)?))
        } else if fields.contains("traitName") {
            Ok(Self::Trait(TraitDefinition::from_json_at(value, context)?))
        } else if fields.contains("$type") {
            Ok(Self::Entity(Entity::from_json_at(value, context)?))
        } else {
            Err(ModelError::MalformedDocument {
                context: context.to_string(),
                message: "expected one of 'purposeName', 'traitName' or '$type'".to_string(),
            })
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Purpose(purpose) => purpose.to_json(),
            Self::Trait(definition) => definition.to_json(),
            Self::Entity(entity) => entity.to_json(),
        }
    }
}

impl From<Purpose> for Definition {
    fn from(purpose: Purpose) -> Self {
        Self::Purpose(purpose)
    }
}

impl From<TraitDefinition> for Definition {
    fn from(definition: TraitDefinition) -> Self {
        Self::Trait(definition)
    }
}

impl From<Entity> for Definition {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

/// A loaded schema document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub json_schema_semantic_version: Option<String>,
    pub imports: Vec<Import>,
    pub definitions: Vec<Definition>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition
    pub fn with_definition(mut self, definition: impl Into<Definition>) -> Self {
        self.definitions.push(definition.into());
        self
    }

    /// Load a document from a file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::IoError(path.display().to_string(), e.to_string()))?;

        let document = Self::from_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            definitions = document.definitions.len(),
            imports = document.imports.len(),
            "loaded document"
        );

        Ok(document)
    }

    /// Parse a document from a JSON string
    pub fn from_str(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json).map_err(|e| DocumentError::ParseError(e.to_string()))?;
        Ok(Self::from_json(&value)?)
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json())
    }

    /// Save to file
    pub fn save_to_file(&self, path: &Path) -> Result<(), DocumentError> {
        let json = self
            .to_string_pretty()
            .map_err(|e| DocumentError::ParseError(e.to_string()))?;

        std::fs::write(path, json).map_err(|e| DocumentError::IoError(path.display().to_string(), e.to_string()))
    }

    /// Check that purpose, trait and entity names are unique within the document
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen: HashSet<(&'static str, &str)> = HashSet::new();

        for definition in &self.definitions {
            if !seen.insert((definition.kind(), definition.name())) {
                return Err(ModelError::DuplicateDefinition {
                    kind: definition.kind(),
                    name: definition.name().to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn purposes(&self) -> impl Iterator<Item = &Purpose> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Purpose(purpose) => Some(purpose),
            _ => None,
        })
    }

    pub fn trait_definitions(&self) -> impl Iterator<Item = &TraitDefinition> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Trait(definition) => Some(definition),
            _ => None,
        })
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Entity(entity) => Some(entity),
            _ => None,
        })
    }

    /// Find an entity by name
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities().find(|e| e.name() == name)
    }

    /// Resolve the effective traits of the named purpose
    pub fn resolve_purpose(&self, name: &str) -> Result<EffectiveTraits, ModelError> {
        let purpose = self.purpose(name).ok_or_else(|| ModelError::UnresolvedReference {
            kind: Purpose::KIND,
            name: name.to_string(),
        })?;

        resolve::resolve_purpose(purpose, self)
    }

    /// Resolve the effective parameters of the named trait
    pub fn resolve_trait(&self, name: &str) -> Result<EffectiveParameters, ModelError> {
        let definition = self
            .trait_definition(name)
            .ok_or_else(|| ModelError::UnresolvedReference {
                kind: TraitDefinition::KIND,
                name: name.to_string(),
            })?;

        resolve::resolve_trait(definition, self)
    }
}

impl DefinitionLookup for Document {
    fn purpose(&self, name: &str) -> Option<&Purpose> {
        self.purposes().find(|p| p.purpose_name == name)
    }

    fn trait_definition(&self, name: &str) -> Option<&TraitDefinition> {
        self.trait_definitions().find(|t| t.trait_name == name)
    }
}

impl JsonObject for Document {
    const KIND: &'static str = "document";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let fields = Fields::of(value, context)?;

        let document = Self {
            json_schema_semantic_version: fields.optional_str("jsonSchemaSemanticVersion")?,
            imports: fields.objects("imports")?,
            definitions: fields.objects("definitions")?,
        };

        document.validate()?;
        tracing::debug!(definitions = document.definitions.len(), "parsed document");

        Ok(document)
    }

    fn to_json(&self) -> Value {
        ObjectBuilder::new()
            .opt_str("jsonSchemaSemanticVersion", self.json_schema_semantic_version.as_deref())
            .array("imports", self.imports.iter().map(Import::to_json))
            .array("definitions", self.definitions.iter().map(Definition::to_json))
            .build()
    }
}
