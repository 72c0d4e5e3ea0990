//! cdmodel Core
//!
//! Object model for schema documents: purposes, traits, entities and the
//! name-or-definition references between them, with JSON round-tripping and
//! inheritance resolution.

pub mod error;
pub mod object;
pub mod reference;
pub mod traits;
pub mod purpose;
pub mod attribute;
pub mod partition;
pub mod import;
pub mod entity;
pub mod resolve;
pub mod document;
pub mod config;

pub use error::{DocumentError, JsonShape, ModelError};
pub use object::JsonObject;
pub use reference::{NamedReferenceOrDefinition, Referenceable};
pub use traits::{Parameter, TraitArgument, TraitDefinition, TraitReference};
pub use purpose::Purpose;
pub use attribute::{Attribute, DataType};
pub use partition::{CsvFormatSettings, CsvQuoteStyle, CsvStyle, FileFormatSettings, Partition};
pub use import::Import;
pub use entity::{Entity, EntityHeader, LocalEntity, ReferenceEntity};
pub use resolve::{resolve_purpose, resolve_trait, DefinitionLookup, EffectiveParameters, EffectiveTraits, Inheritable};
pub use document::{Definition, Document};
pub use config::{Config, ConfigError, IgnoreMatcher, StagingConfig};
