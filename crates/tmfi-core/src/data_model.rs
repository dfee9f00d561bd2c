//! Data Model: RawValue, Field, Record, Correction, Verdict
//!
//! Records are ingested from loosely shaped JSON. Nothing here rejects a
//! record for data-quality reasons; structural problems are collected in
//! `Record::shape_errors` so the validator can report them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

/// Key of the field list in the wire form of a record
pub const FIELD_LIST_KEY: &str = "serviceSpecCharacteristic";

/// Key of the unit inside a field's value object
pub const UNIT_KEY: &str = "unitOfMeasure";

/// A value as supplied by the generator, tagged once at ingestion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<RawValue>),
    Object(Map<String, Value>),
}

/// Runtime shape of a `RawValue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueTag {
    Null,
    Bool,
    Integer,
    Float,
    Text,
    Array,
    Object,
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueTag::Null => "null",
            ValueTag::Bool => "bool",
            ValueTag::Integer => "integer",
            ValueTag::Float => "float",
            ValueTag::Text => "text",
            ValueTag::Array => "array",
            ValueTag::Object => "object",
        };
        f.write_str(s)
    }
}

impl RawValue {
    pub fn tag(&self) -> ValueTag {
        match self {
            RawValue::Null => ValueTag::Null,
            RawValue::Bool(_) => ValueTag::Bool,
            RawValue::Integer(_) => ValueTag::Integer,
            RawValue::Float(_) => ValueTag::Float,
            RawValue::Text(_) => ValueTag::Text,
            RawValue::Array(_) => ValueTag::Array,
            RawValue::Object(_) => ValueTag::Object,
        }
    }

    /// Numeric reading of the value: numbers as-is, text parsed after trimming.
    /// Booleans are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Integer(i) => Some(*i as f64),
            RawValue::Float(f) => Some(*f),
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Integer(i) => Value::Number((*i).into()),
            RawValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            RawValue::Text(s) => Value::String(s.clone()),
            RawValue::Array(items) => Value::Array(items.iter().map(RawValue::to_json).collect()),
            RawValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RawValue::Text(s),
            Value::Array(items) => RawValue::Array(items.into_iter().map(RawValue::from).collect()),
            Value::Object(map) => RawValue::Object(map),
        }
    }
}

impl From<RawValue> for Value {
    fn from(value: RawValue) -> Self {
        value.to_json()
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

/// Text is shown bare, everything else in its JSON form (`100.0`, `true`, `["a"]`).
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// A field's value together with the unit the generator attached to it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(default)]
    pub value: RawValue,
    #[serde(rename = "unitOfMeasure", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FieldValue {
    pub fn new(value: RawValue, unit: Option<&str>) -> Self {
        Self {
            value,
            unit: unit.map(str::to_string),
        }
    }

    /// Supplied unit, `None` when absent or blank
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// One `(declaredName, FieldValue)` entry of a record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    /// Position in the ingested field list; `None` for fields built in code
    #[serde(skip)]
    pub index: Option<usize>,
    /// Name as the generator declared it, kept once the field is renamed
    #[serde(skip)]
    pub declared_name: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, value: RawValue, unit: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(FieldValue::new(value, unit)),
            index: None,
            declared_name: None,
        }
    }

    /// Name before reconciliation
    pub fn original_name(&self) -> Option<&str> {
        self.declared_name.as_deref().or(self.name.as_deref())
    }
}

/// The structured intent produced by the generator
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Record {
    /// Serialized as `null` when missing; the wire form always has all three keys
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "serviceSpecCharacteristic")]
    pub fields: Vec<Field>,
    /// Structural problems found while ingesting; reported by the format check
    #[serde(skip)]
    pub shape_errors: Vec<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(ValueTag),
}

impl Record {
    pub fn new(name: impl Into<String>, description: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            fields,
            shape_errors: Vec::new(),
        }
    }

    /// Build a record from any JSON object, tolerating missing or mistyped members.
    pub fn from_json(value: Value) -> Result<Self, IngestError> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => return Err(IngestError::NotAnObject(RawValue::from(other).tag())),
        };

        let mut shape_errors = Vec::new();
        let name = take_text(&mut obj, "name", "'name'", &mut shape_errors);
        let description = take_text(&mut obj, "description", "'description'", &mut shape_errors);

        let mut fields = Vec::new();
        match obj.remove(FIELD_LIST_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::Array(entries)) => {
                for (i, entry) in entries.into_iter().enumerate() {
                    match entry {
                        Value::Object(mut entry) => {
                            let label = format!("Characteristic {} 'name'", i);
                            let name = take_text(&mut entry, "name", &label, &mut shape_errors);
                            let value = entry.remove("value").map(ingest_field_value);
                            fields.push(Field {
                                name,
                                value,
                                index: Some(i),
                                declared_name: None,
                            });
                        }
                        _ => shape_errors.push(format!("Characteristic {} is not an object", i)),
                    }
                }
            }
            Some(_) => shape_errors.push(format!("'{}' must be a list", FIELD_LIST_KEY)),
        }

        Ok(Self {
            name,
            description,
            fields,
            shape_errors,
        })
    }

    /// Wire form: `{name, description, serviceSpecCharacteristic: [...]}`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn take_text(
    obj: &mut Map<String, Value>,
    key: &str,
    label: &str,
    shape_errors: &mut Vec<String>,
) -> Option<String> {
    match obj.remove(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            shape_errors.push(format!("{} must be a string", label));
            Some(other.to_string())
        }
    }
}

fn ingest_field_value(value: Value) -> FieldValue {
    match value {
        Value::Object(mut obj) => {
            let unit = match obj.remove(UNIT_KEY) {
                Some(Value::String(s)) => Some(s),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            };
            FieldValue {
                value: obj.remove("value").map(RawValue::from).unwrap_or_default(),
                unit,
            }
        }
        bare => FieldValue {
            value: RawValue::from(bare),
            unit: None,
        },
    }
}

/// Category of a rewrite applied to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionKind {
    Name,
    Type,
    Unit,
}

impl fmt::Display for CorrectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionKind::Name => f.write_str("NAME"),
            CorrectionKind::Type => f.write_str("TYPE"),
            CorrectionKind::Unit => f.write_str("UNIT"),
        }
    }
}

/// One logged rewrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    /// Field name as the generator declared it
    pub field: String,
    pub kind: CorrectionKind,
    pub from: RawValue,
    pub to: RawValue,
    /// The rewrite is a guess (BINARY default)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub low_confidence: bool,
}

impl Correction {
    pub fn new(field: impl Into<String>, kind: CorrectionKind, from: RawValue, to: RawValue) -> Self {
        Self {
            field: field.into(),
            kind,
            from,
            to,
            low_confidence: false,
        }
    }

    pub fn low_confidence(mut self) -> Self {
        self.low_confidence = true;
        self
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} '{}' -> '{}'", self.field, self.kind, self.from, self.to)?;
        if self.low_confidence {
            f.write_str(" (low confidence)")?;
        }
        Ok(())
    }
}

/// Append-only, per-record log of corrections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionLog {
    entries: Vec<Correction>,
}

impl CorrectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, correction: Correction) {
        self.entries.push(correction);
    }

    pub fn extend(&mut self, corrections: impl IntoIterator<Item = Correction>) {
        self.entries.extend(corrections);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Correction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> CorrectionSummary {
        let mut summary = CorrectionSummary::default();
        for c in &self.entries {
            summary.record(c);
        }
        summary
    }
}

/// Counts of corrections by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    pub total: usize,
    pub name_corrections: usize,
    pub type_corrections: usize,
    pub unit_corrections: usize,
    pub low_confidence: usize,
}

impl CorrectionSummary {
    pub fn record(&mut self, correction: &Correction) {
        self.total += 1;
        match correction.kind {
            CorrectionKind::Name => self.name_corrections += 1,
            CorrectionKind::Type => self.type_corrections += 1,
            CorrectionKind::Unit => self.unit_corrections += 1,
        }
        if correction.low_confidence {
            self.low_confidence += 1;
        }
    }

    pub fn merge(&mut self, other: &CorrectionSummary) {
        self.total += other.total;
        self.name_corrections += other.name_corrections;
        self.type_corrections += other.type_corrections;
        self.unit_corrections += other.unit_corrections;
        self.low_confidence += other.low_confidence;
    }
}

/// Outcome of validating one record.
///
/// Only constructible through [`Verdict::compose`], which derives the flags
/// from the error lists; plausibility warnings never affect `overall_valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    format_valid: bool,
    characteristics_valid: bool,
    plausibility_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    overall_valid: bool,
}

impl Verdict {
    pub fn compose(format_errors: Vec<String>, catalog_errors: Vec<String>, warnings: Vec<String>) -> Self {
        let format_valid = format_errors.is_empty();
        let characteristics_valid = catalog_errors.is_empty();
        let mut errors = format_errors;
        errors.extend(catalog_errors);
        Self {
            format_valid,
            characteristics_valid,
            plausibility_valid: true,
            errors,
            warnings,
            overall_valid: format_valid && characteristics_valid,
        }
    }

    pub fn format_valid(&self) -> bool {
        self.format_valid
    }

    pub fn characteristics_valid(&self) -> bool {
        self.characteristics_valid
    }

    pub fn plausibility_valid(&self) -> bool {
        self.plausibility_valid
    }

    pub fn overall_valid(&self) -> bool {
        self.overall_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Per-stage trace recorded by the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProof {
    pub id: String,
    pub in_hash: String,
    pub out_hash: String,
    pub deterministic: bool,
    pub latency_us: u64,
    /// Corrections appended by this stage
    pub corrections: usize,
}

impl StageProof {
    pub fn changed(&self) -> bool {
        self.in_hash != self.out_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_value_tags_follow_json_tokens() {
        assert_eq!(RawValue::from(json!(100)).tag(), ValueTag::Integer);
        assert_eq!(RawValue::from(json!(100.0)).tag(), ValueTag::Float);
        assert_eq!(RawValue::from(json!("100")).tag(), ValueTag::Text);
        assert_eq!(RawValue::from(json!(true)).tag(), ValueTag::Bool);
        assert_eq!(RawValue::from(json!(["a"])).tag(), ValueTag::Array);
    }

    #[test]
    fn test_display_keeps_float_form() {
        assert_eq!(RawValue::Float(100.0).to_string(), "100.0");
        assert_eq!(RawValue::Text("abc".into()).to_string(), "abc");
        assert_eq!(RawValue::Integer(7).to_string(), "7");
    }

    #[test]
    fn test_record_from_json_wire_shape() {
        let record = Record::from_json(json!({
            "name": "Test",
            "description": "Test intent",
            "serviceSpecCharacteristic": [
                {"name": "Delay tolerance", "value": {"value": "100", "unitOfMeasure": "ms"}}
            ]
        }))
        .unwrap();

        assert_eq!(record.name.as_deref(), Some("Test"));
        assert_eq!(record.fields.len(), 1);
        let value = record.fields[0].value.as_ref().unwrap();
        assert_eq!(value.value, RawValue::Text("100".into()));
        assert_eq!(value.unit(), Some("ms"));
        assert!(record.shape_errors.is_empty());
    }

    #[test]
    fn test_record_tolerates_malformed_members() {
        let record = Record::from_json(json!({
            "name": 42,
            "serviceSpecCharacteristic": [
                "not an object",
                {"name": "Availability", "value": 99.9}
            ]
        }))
        .unwrap();

        assert_eq!(record.name.as_deref(), Some("42"));
        assert!(record.description.is_none());
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields[0].value.as_ref().unwrap().value, RawValue::Float(99.9));
        assert_eq!(record.fields[0].index, Some(1));
        assert_eq!(record.shape_errors.len(), 2);
    }

    #[test]
    fn test_missing_header_serializes_as_null() {
        let record = Record::from_json(json!({"serviceSpecCharacteristic": []})).unwrap();
        let wire = record.to_json();
        let keys: Vec<&String> = wire.as_object().unwrap().keys().collect();

        assert_eq!(keys.len(), 3);
        assert_eq!(wire["name"], Value::Null);
        assert_eq!(wire["description"], Value::Null);
    }

    #[test]
    fn test_original_name_survives_rename() {
        let mut field = Field::new("E2E latency", RawValue::Integer(5), Some("ms"));
        assert_eq!(field.original_name(), Some("E2E latency"));

        field.declared_name = field.name.replace("Delay tolerance".to_string());
        assert_eq!(field.name.as_deref(), Some("Delay tolerance"));
        assert_eq!(field.original_name(), Some("E2E latency"));
    }

    #[test]
    fn test_record_rejects_non_object() {
        assert_eq!(
            Record::from_json(json!([1, 2])),
            Err(IngestError::NotAnObject(ValueTag::Array))
        );
    }

    #[test]
    fn test_record_serializes_to_wire_shape() {
        let record = Record::new(
            "Slice",
            "Low latency",
            vec![Field::new("Delay tolerance", RawValue::Float(10.0), Some("ms"))],
        );
        assert_eq!(
            record.to_json(),
            json!({
                "name": "Slice",
                "description": "Low latency",
                "serviceSpecCharacteristic": [
                    {"name": "Delay tolerance", "value": {"value": 10.0, "unitOfMeasure": "ms"}}
                ]
            })
        );
    }

    #[test]
    fn test_verdict_compose() {
        let verdict = Verdict::compose(vec![], vec![], vec!["odd value".into()]);
        assert!(verdict.overall_valid());
        assert!(verdict.plausibility_valid());

        let verdict = Verdict::compose(vec![], vec!["not found".into()], vec![]);
        assert!(verdict.format_valid());
        assert!(!verdict.characteristics_valid());
        assert!(!verdict.overall_valid());
        assert_eq!(verdict.errors(), ["not found".to_string()]);
    }

    #[test]
    fn test_verdict_wire_keys() {
        let verdict = Verdict::compose(vec!["Missing required field: 'name'".into()], vec![], vec![]);
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["formatValid"], json!(false));
        assert_eq!(json["characteristicsValid"], json!(true));
        assert_eq!(json["plausibilityValid"], json!(true));
        assert_eq!(json["overallValid"], json!(false));
    }

    #[test]
    fn test_correction_summary() {
        let mut log = CorrectionLog::new();
        log.push(Correction::new("a", CorrectionKind::Name, "x".into(), "a".into()));
        log.push(
            Correction::new("b", CorrectionKind::Type, "maybe".into(), RawValue::Bool(true)).low_confidence(),
        );
        let summary = log.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.name_corrections, 1);
        assert_eq!(summary.type_corrections, 1);
        assert_eq!(summary.low_confidence, 1);
    }
}
