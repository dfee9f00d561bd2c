//! TMFI Registry: the catalog of characteristics
//!
//! Loaded once at startup and read-only afterwards. Lookups are exact and
//! case-sensitive; iteration preserves source order.
//!
//! # Example
//!
//! ```ignore
//! use tmfi_registry::Registry;
//!
//! let registry = Registry::load("catalogs/gst-core.json")?;
//! let spec = registry.lookup("Delay tolerance").unwrap();
//! println!("{} is {:?} in {:?}", spec.name, spec.value_type, spec.unit);
//! ```

pub mod catalog;
pub mod field_spec;

pub use catalog::{CatalogFormat, SpecLoadError};
pub use field_spec::{FieldSpec, ValueType};

use std::collections::HashMap;
use std::path::Path;

/// Keywords marking the characteristics most intents refer to
const PRIORITY_KEYWORDS: &[&str] = &[
    "bandwidth",
    "throughput",
    "latency",
    "delay",
    "availability",
    "reliability",
    "coverage",
    "area",
    "energy",
    "efficiency",
    "user",
    "communication",
];

/// Read-only table of field specs keyed by name
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Load a catalog file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpecLoadError> {
        let path = path.as_ref();
        let registry = Self::from_specs(catalog::read_path(path)?);
        tracing::info!(path = %path.display(), characteristics = registry.len(), "catalog loaded");
        Ok(registry)
    }

    pub fn from_json_str(content: &str) -> Result<Self, SpecLoadError> {
        Ok(Self::from_specs(catalog::parse(content, CatalogFormat::Json)?))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SpecLoadError> {
        Ok(Self::from_specs(catalog::parse(content, CatalogFormat::Yaml)?))
    }

    /// Build from specs in order; a repeated name keeps its first entry
    pub fn from_specs(specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        let mut registry = Self::default();
        for spec in specs {
            if registry.index.contains_key(&spec.name) {
                tracing::warn!(characteristic = %spec.name, "duplicate catalog entry ignored");
                continue;
            }
            registry.index.insert(spec.name.clone(), registry.specs.len());
            registry.specs.push(spec);
        }
        registry
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All specs in source order
    pub fn all(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specs whose name mentions one of the priority keywords, in source order
    pub fn key_characteristics(&self) -> Vec<&FieldSpec> {
        self.specs
            .iter()
            .filter(|s| {
                let lowered = s.name.to_lowercase();
                PRIORITY_KEYWORDS.iter().any(|kw| lowered.contains(kw))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::from_specs(vec![
            FieldSpec::new("Delay tolerance", ValueType::Float, Some("ms")),
            FieldSpec::new("Isolation level", ValueType::Enum, None),
            FieldSpec::new("Availability", ValueType::Float, Some("%")),
            FieldSpec::new("Delay tolerance", ValueType::Text, None),
        ])
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = registry();
        assert!(registry.lookup("Delay tolerance").is_some());
        assert!(registry.lookup("delay tolerance").is_none());
        assert!(registry.lookup("Delay").is_none());
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.lookup("Delay tolerance").unwrap().value_type,
            Some(ValueType::Float)
        );
    }

    #[test]
    fn test_all_preserves_order() {
        let reg = registry();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(names, vec!["Delay tolerance", "Isolation level", "Availability"]);
    }

    #[test]
    fn test_key_characteristics() {
        let registry = registry();
        let keys: Vec<&str> = registry.key_characteristics().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(keys, vec!["Delay tolerance", "Availability"]);
    }

    #[test]
    fn test_yaml_catalog_matches_built_specs() {
        let yaml = r#"
serviceSpecCharacteristic:
  - name: Delay tolerance
    description: Maximum end-to-end delay
    valueType: FLOAT
    serviceSpecCharacteristicValue:
      - unitOfMeasure: ms
  - name: Isolation level
    valueType: ENUM
"#;
        let registry = Registry::from_yaml_str(yaml).unwrap();
        assert_eq!(
            registry.all(),
            &[
                FieldSpec::new("Delay tolerance", ValueType::Float, Some("ms"))
                    .with_description("Maximum end-to-end delay"),
                FieldSpec::new("Isolation level", ValueType::Enum, None),
            ]
        );
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let json = r#"{"serviceSpecCharacteristic": [{"name": "Availability", "valueType": "FLOAT", "unitOfMeasure": "percent"}]}"#;
        let yaml = "serviceSpecCharacteristic:\n  - {name: Availability, valueType: FLOAT, unitOfMeasure: percent}\n";
        assert_eq!(
            Registry::from_json_str(json).unwrap().all(),
            Registry::from_yaml_str(yaml).unwrap().all()
        );
    }
}
