//! Catalog entry types
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared primitive type of a characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    Integer,
    Float,
    Text,
    Binary,
    Enum,
    Set,
}

impl ValueType {
    /// Case-insensitive parse of the catalog's type label
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "INTEGER" => Some(ValueType::Integer),
            "FLOAT" => Some(ValueType::Float),
            "TEXT" => Some(ValueType::Text),
            "BINARY" => Some(ValueType::Binary),
            "ENUM" => Some(ValueType::Enum),
            "SET" => Some(ValueType::Set),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Integer => "INTEGER",
            ValueType::Float => "FLOAT",
            ValueType::Text => "TEXT",
            ValueType::Binary => "BINARY",
            ValueType::Enum => "ENUM",
            ValueType::Set => "SET",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One characteristic of the catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    /// `None` for catalog entries that declare no type; such fields skip the type check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(rename = "unitOfMeasure", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value_type: Some(value_type),
            unit: unit.map(str::to_string),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declared unit, `None` when absent or blank
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}
