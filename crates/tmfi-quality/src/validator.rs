//! Record validation against the catalog
//!
//! Three independent checks composed into one verdict: format and catalog
//! problems are errors, plausibility problems are warnings.

use crate::checks::{plausibility, Check, CheckStatus};
use crate::profile::PlausibilityBounds;
use serde::Serialize;
use tmfi_core::{RawValue, Record, UnitSynonyms, Verdict};
use tmfi_registry::{Registry, ValueType};

/// Verdict plus the individual checks behind it
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub verdict: Verdict,

    /// Individual check results
    pub checks: Vec<Check>,

    /// Profile used for plausibility
    pub profile: String,

    /// Summary message
    pub summary: String,
}

/// Validator for reconciled and corrected records. Never mutates its input.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    bounds: PlausibilityBounds,
    units: UnitSynonyms,
}

impl Validator {
    pub fn new(bounds: PlausibilityBounds, units: UnitSynonyms) -> Self {
        Self { bounds, units }
    }

    /// Create a validator for a plausibility mode ("standard" or "strict")
    pub fn for_mode(mode: &str) -> Self {
        Self::new(PlausibilityBounds::for_mode(mode), UnitSynonyms::default())
    }

    pub fn bounds(&self) -> &PlausibilityBounds {
        &self.bounds
    }

    pub fn validate(&self, record: &Record, registry: &Registry) -> Verdict {
        self.evaluate(record, registry).verdict
    }

    pub fn evaluate(&self, record: &Record, registry: &Registry) -> ValidationReport {
        let format_errors = self.check_format(record);
        let catalog_errors = self.check_catalog(record, registry);
        let warnings = self.check_plausibility(record, registry);

        let mut checks: Vec<Check> = format_errors
            .iter()
            .map(|e| Check::fail("format", e.as_str()))
            .chain(catalog_errors.iter().map(|e| Check::fail("catalog", e.as_str())))
            .collect();
        let warning_messages = warnings.iter().map(|c| c.message.clone()).collect();
        checks.extend(warnings);

        let verdict = Verdict::compose(format_errors, catalog_errors, warning_messages);
        let summary = summarize(&checks);
        tracing::debug!(
            overall_valid = verdict.overall_valid(),
            errors = verdict.errors().len(),
            warnings = verdict.warnings().len(),
            "record validated"
        );

        ValidationReport {
            verdict,
            checks,
            profile: self.bounds.name.clone(),
            summary,
        }
    }

    /// Non-empty name and description; every field has a name and a value
    fn check_format(&self, record: &Record) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, value) in [("name", &record.name), ("description", &record.description)] {
            match value {
                None => errors.push(format!("Missing required field: '{}'", key)),
                Some(text) if text.trim().is_empty() => {
                    errors.push(format!("Required field '{}' is empty", key))
                }
                Some(_) => {}
            }
        }

        errors.extend(record.shape_errors.iter().cloned());

        for (i, field) in record.fields.iter().enumerate() {
            // Numbered by wire position so dropped entries don't shift later ones
            let position = field.index.unwrap_or(i);
            if field.name.is_none() {
                errors.push(format!("Characteristic {} missing 'name' field", position));
            }
            if field.value.is_none() {
                errors.push(format!("Characteristic {} missing 'value' field", position));
            }
        }

        errors
    }

    /// Names exist, values have the declared shape, units agree
    fn check_catalog(&self, record: &Record, registry: &Registry) -> Vec<String> {
        let mut errors = Vec::new();

        for field in &record.fields {
            let Some(name) = field.name.as_deref() else {
                continue;
            };
            let Some(spec) = registry.lookup(name) else {
                errors.push(format!("Characteristic '{}' not found in specification", name));
                continue;
            };
            let Some(value) = field.value.as_ref() else {
                continue;
            };

            if value.value.is_null() {
                errors.push(format!("{}: Value is missing", name));
            } else if let Some(expected) = spec.value_type {
                if !type_matches(expected, &value.value) {
                    errors.push(format!(
                        "{}: Expected {}, got value '{}' (type: {})",
                        name,
                        expected,
                        value.value,
                        value.value.tag()
                    ));
                }
            }

            if let (Some(expected), Some(supplied)) = (spec.unit(), value.unit()) {
                if !self.units.equivalent(supplied, expected) {
                    errors.push(format!(
                        "{}: Unit '{}' doesn't match specification unit '{}'",
                        name, supplied, expected
                    ));
                }
            }
        }

        errors
    }

    fn check_plausibility(&self, record: &Record, registry: &Registry) -> Vec<Check> {
        record
            .fields
            .iter()
            .filter_map(|f| Some((f.name.as_deref()?, f.value.as_ref()?)))
            .flat_map(|(name, value)| plausibility(name, value, registry.lookup(name), &self.bounds, &self.units))
            .collect()
    }
}

/// Strict shape rules; no parsing happens here
fn type_matches(expected: ValueType, value: &RawValue) -> bool {
    match expected {
        ValueType::Integer => matches!(value, RawValue::Integer(_)),
        ValueType::Float => matches!(value, RawValue::Integer(_) | RawValue::Float(_)),
        ValueType::Text | ValueType::Enum => matches!(value, RawValue::Text(_)),
        ValueType::Binary => matches!(value, RawValue::Bool(_)),
        ValueType::Set => matches!(value, RawValue::Array(_)),
    }
}

fn summarize(checks: &[Check]) -> String {
    let names_with = |status: CheckStatus| {
        let mut names: Vec<&str> = checks
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.name.as_str())
            .collect();
        names.dedup();
        names.join(", ")
    };

    if checks.iter().any(|c| c.status == CheckStatus::Fail) {
        format!("Invalid: {}", names_with(CheckStatus::Fail))
    } else if checks.iter().any(|c| c.status == CheckStatus::Warn) {
        format!("Valid with warnings: {}", names_with(CheckStatus::Warn))
    } else {
        "All checks passed".to_string()
    }
}
