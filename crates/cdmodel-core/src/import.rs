//! Import records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::object::{record_from_json, record_to_json, JsonObject};

/// A declared dependency on another document, optionally aliased
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    /// Path of the imported document
    pub corpus_path: String,

    /// Local alias used to qualify names from the imported document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moniker: Option<String>,
}

impl Import {
    pub fn new(corpus_path: impl Into<String>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            moniker: None,
        }
    }

    pub fn with_moniker(mut self, moniker: impl Into<String>) -> Self {
        self.moniker = Some(moniker.into());
        self
    }
}

impl JsonObject for Import {
    const KIND: &'static str = "import";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let import: Import = record_from_json(value, context)?;
        if import.corpus_path.is_empty() {
            return Err(ModelError::missing_field(context, "corpusPath"));
        }
        Ok(import)
    }

    fn to_json(&self) -> Value {
        record_to_json(self)
    }
}
