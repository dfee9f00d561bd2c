//! Catalog source format and loading.
//!
//! Reads the GST-style document:
//! - one `serviceSpecCharacteristic` list
//! - per entry `name`, optional `description` and `valueType`
//! - unit either on the entry (`unitOfMeasure`) or on its example values

use crate::field_spec::{FieldSpec, ValueType};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(String),
    #[error("catalog has no 'serviceSpecCharacteristic' list")]
    MissingFieldList,
}

/// Top-level catalog file structure
#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    #[serde(rename = "serviceSpecCharacteristic", default)]
    characteristics: Option<Vec<CatalogEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "valueType", default)]
    value_type: Option<String>,
    #[serde(rename = "unitOfMeasure", default)]
    unit: Option<String>,
    #[serde(rename = "serviceSpecCharacteristicValue", default)]
    values: Vec<CatalogValue>,
}

/// Example value of a characteristic; only its unit matters here
#[derive(Debug, Clone, Deserialize)]
struct CatalogValue {
    #[serde(rename = "unitOfMeasure", default)]
    unit: Option<String>,
}

/// Source syntax of a catalog document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// `.yaml`/`.yml` are YAML, everything else JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => CatalogFormat::Yaml,
            _ => CatalogFormat::Json,
        }
    }
}

pub(crate) fn read_path(path: &Path) -> Result<Vec<FieldSpec>, SpecLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| SpecLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&content, CatalogFormat::from_path(path))
}

pub(crate) fn parse(content: &str, format: CatalogFormat) -> Result<Vec<FieldSpec>, SpecLoadError> {
    let file: CatalogFile = match format {
        CatalogFormat::Json => serde_json::from_str(content).map_err(|e| SpecLoadError::Parse(e.to_string()))?,
        CatalogFormat::Yaml => serde_yaml::from_str(content).map_err(|e| SpecLoadError::Parse(e.to_string()))?,
    };

    let entries = file.characteristics.ok_or(SpecLoadError::MissingFieldList)?;
    Ok(entries.into_iter().map(compile_entry).collect())
}

fn compile_entry(entry: CatalogEntry) -> FieldSpec {
    let value_type = entry.value_type.as_deref().and_then(|label| {
        let parsed = ValueType::parse(label);
        if parsed.is_none() {
            tracing::warn!(characteristic = %entry.name, value_type = label, "unknown valueType, type check disabled");
        }
        parsed
    });

    let unit = non_blank(entry.unit).or_else(|| entry.values.into_iter().find_map(|v| non_blank(v.unit)));

    FieldSpec {
        name: entry.name,
        value_type,
        unit,
        description: non_blank(entry.description),
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
