//! Partition records and file format settings

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::object::{record_from_json, record_to_json, JsonObject};

/// CSV quoting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CsvQuoteStyle {
    #[default]
    #[serde(rename = "QuoteStyle.Csv")]
    Csv,

    #[serde(rename = "QuoteStyle.None")]
    None,
}

/// When CSV values are quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CsvStyle {
    #[default]
    #[serde(rename = "CsvStyle.QuoteAlways")]
    QuoteAlways,

    #[serde(rename = "CsvStyle.QuoteAfterDelimiter")]
    QuoteAfterDelimiter,
}

/// CSV settings as written; absent fields take the defaults returned by the accessors
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvFormatSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_headers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_style: Option<CsvQuoteStyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_style: Option<CsvStyle>,
}

impl CsvFormatSettings {
    pub fn column_headers(&self) -> bool {
        self.column_headers.unwrap_or(false)
    }

    pub fn delimiter(&self) -> &str {
        self.delimiter.as_deref().unwrap_or(",")
    }

    pub fn quote_style(&self) -> CsvQuoteStyle {
        self.quote_style.unwrap_or_default()
    }

    pub fn csv_style(&self) -> CsvStyle {
        self.csv_style.unwrap_or_default()
    }
}

/// Format of a partition's data, discriminated by `$type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum FileFormatSettings {
    CsvFormatSettings(CsvFormatSettings),
}

/// A physical slice of an entity's data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_time: Option<String>,

    /// Opaque location; resolving it is up to the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_format_settings: Option<FileFormatSettings>,
}

impl Partition {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn with_csv(mut self, settings: CsvFormatSettings) -> Self {
        self.file_format_settings = Some(FileFormatSettings::CsvFormatSettings(settings));
        self
    }

    /// CSV settings, if the partition is CSV-formatted
    pub fn csv_settings(&self) -> Option<&CsvFormatSettings> {
        match &self.file_format_settings {
            Some(FileFormatSettings::CsvFormatSettings(settings)) => Some(settings),
            None => None,
        }
    }
}

impl JsonObject for Partition {
    const KIND: &'static str = "partition";

    fn from_json_at(value: &Value, context: &str) -> Result<Self, ModelError> {
        let partition: Partition = record_from_json(value, context)?;
        if partition.name.is_empty() {
            return Err(ModelError::missing_field(context, "name"));
        }
        Ok(partition)
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
    fn csv_partition_roundtrip() {
        let value = json!({
            "name": "customers-2024",
            "refreshTime": "2024-03-01T00:00:00Z",
            "location": "https://storage.example.net/data/customers/part-0.csv",
            "fileFormatSettings": {
                "$type": "CsvFormatSettings",
                "columnHeaders": true,
                "quoteStyle": "QuoteStyle.None"
            }
        });

        let partition = Partition::from_json(&value).unwrap();
        let csv = partition.csv_settings().unwrap();
        assert!(csv.column_headers());
        assert_eq!(csv.delimiter(), ",");
        assert_eq!(csv.quote_style(), CsvQuoteStyle::None);
        assert_eq!(csv.csv_style(), CsvStyle::QuoteAlways);
        assert_eq!(partition.to_json(), value);
    }

    #[test]
    fn unknown_format_is_malformed() {
        let value = json!({ "name": "p", "fileFormatSettings": { "$type": "ParquetFormatSettings" } });
        assert!(matches!(
            Partition::from_json(&value),
            Err(ModelError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn location_is_kept_verbatim() {
        let partition = Partition::from_json(&json!({ "name": "p", "location": "../relative/path.csv" })).unwrap();
        assert_eq!(partition.location.as_deref(), Some("../relative/path.csv"));
        assert!(partition.csv_settings().is_none());
    }
}
