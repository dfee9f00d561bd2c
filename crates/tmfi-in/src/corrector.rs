//! Type and unit correction.
//!
//! Best-effort coercion of a field value toward its catalog type. SET,
//! BINARY, INTEGER and FLOAT are repaired; TEXT and ENUM are left to the
//! validator. Unparseable values pass through untouched.

use crate::config::CorrectorConfig;
use tmfi_core::{Correction, CorrectionKind, CorrectionLog, FieldValue, RawValue, Record};
use tmfi_registry::{FieldSpec, Registry, ValueType};

/// Result of coercing a raw value
#[derive(Debug, Clone, PartialEq)]
enum Coercion {
    Unchanged,
    Converted(RawValue),
    /// Converted by falling back to a default
    Guessed(RawValue),
}

/// Corrects field values against a single spec at a time
#[derive(Debug, Clone, Default)]
pub struct TypeCorrector {
    config: CorrectorConfig,
}

impl TypeCorrector {
    pub fn new(config: CorrectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    /// Correct one value; `field` is the name the corrections are logged under.
    /// Pure: the same input always yields the same output, and correcting the
    /// output again yields no corrections.
    pub fn correct(&self, field: &str, value: &FieldValue, spec: &FieldSpec) -> (FieldValue, Vec<Correction>) {
        let mut corrected = value.clone();
        let mut corrections = Vec::new();

        if let Some(value_type) = spec.value_type {
            let coercion = self.coerce(&value.value, value_type);
            let (to, guessed) = match coercion {
                Coercion::Unchanged => (None, false),
                Coercion::Converted(v) => (Some(v), false),
                Coercion::Guessed(v) => (Some(v), true),
            };
            if let Some(to) = to.filter(|to| *to != value.value) {
                let mut correction = Correction::new(field, CorrectionKind::Type, value.value.clone(), to.clone());
                if guessed {
                    tracing::warn!(field, from = %value.value, "BINARY value unrecognised, defaulting to true");
                    correction = correction.low_confidence();
                }
                corrected.value = to;
                corrections.push(correction);
            }
        }

        if let (Some(expected), Some(supplied)) = (spec.unit(), value.unit()) {
            if supplied != expected && self.config.unit_synonyms.equivalent(supplied, expected) {
                corrections.push(Correction::new(
                    field,
                    CorrectionKind::Unit,
                    RawValue::from(supplied),
                    RawValue::from(expected),
                ));
                corrected.unit = Some(expected.to_string());
            }
        }

        (corrected, corrections)
    }

    /// Correct every field whose name is in the registry, logging each rewrite
    pub fn correct_record(&self, record: &mut Record, registry: &Registry, log: &mut CorrectionLog) {
        for field in record.fields.iter_mut() {
            let (Some(name), Some(value)) = (field.name.as_deref(), field.value.as_ref()) else {
                continue;
            };
            let Some(spec) = registry.lookup(name) else {
                continue;
            };

            let original = field.original_name().unwrap_or(name);
            let (corrected, corrections) = self.correct(original, value, spec);
            if corrections.is_empty() {
                continue;
            }
            for c in &corrections {
                tracing::debug!(correction = %c, "value corrected");
            }
            log.extend(corrections);
            field.value = Some(corrected);
        }
    }

    fn coerce(&self, value: &RawValue, value_type: ValueType) -> Coercion {
        match value_type {
            ValueType::Set => coerce_set(value),
            ValueType::Binary => self.coerce_binary(value),
            ValueType::Integer => coerce_integer(value),
            ValueType::Float => coerce_float(value),
            ValueType::Text | ValueType::Enum => Coercion::Unchanged,
        }
    }

    fn coerce_binary(&self, value: &RawValue) -> Coercion {
        match value {
            RawValue::Integer(i) => Coercion::Converted(RawValue::Bool(*i != 0)),
            RawValue::Float(f) => Coercion::Converted(RawValue::Bool(*f != 0.0)),
            RawValue::Text(s) => {
                let lowered = s.trim().to_lowercase();
                if self.config.affirmative.iter().any(|w| w.to_lowercase() == lowered) {
                    Coercion::Converted(RawValue::Bool(true))
                } else if self.config.negative.iter().any(|w| w.to_lowercase() == lowered) {
                    Coercion::Converted(RawValue::Bool(false))
                } else if let Some(n) = value.as_number() {
                    Coercion::Converted(RawValue::Bool(n > 0.0))
                } else {
                    Coercion::Guessed(RawValue::Bool(true))
                }
            }
            _ => Coercion::Unchanged,
        }
    }
}

fn coerce_set(value: &RawValue) -> Coercion {
    match value {
        RawValue::Text(s) if s.contains(',') => Coercion::Converted(RawValue::Array(
            s.split(',').map(str::trim).map(RawValue::from).collect(),
        )),
        RawValue::Text(_) => Coercion::Converted(RawValue::Array(vec![value.clone()])),
        RawValue::Integer(_) | RawValue::Float(_) | RawValue::Bool(_) => {
            Coercion::Converted(RawValue::Array(vec![RawValue::Text(value.to_string())]))
        }
        _ => Coercion::Unchanged,
    }
}

fn coerce_integer(value: &RawValue) -> Coercion {
    match value {
        RawValue::Float(f) => round_half_up(*f).map_or(Coercion::Unchanged, |i| Coercion::Converted(RawValue::Integer(i))),
        RawValue::Text(s) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                return Coercion::Converted(RawValue::Integer(i));
            }
            value
                .as_number()
                .and_then(round_half_up)
                .map_or(Coercion::Unchanged, |i| Coercion::Converted(RawValue::Integer(i)))
        }
        _ => Coercion::Unchanged,
    }
}

fn coerce_float(value: &RawValue) -> Coercion {
    match value {
        RawValue::Text(_) => value
            .as_number()
            .map_or(Coercion::Unchanged, |f| Coercion::Converted(RawValue::Float(f))),
        _ => Coercion::Unchanged,
    }
}

/// Nearest integer with halves rounded up; `None` outside the i64 range
fn round_half_up(f: f64) -> Option<i64> {
    let rounded = (f + 0.5).floor();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}
