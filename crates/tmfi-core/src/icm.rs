//! ICM export: TMF921 records as Intent Common Model JSON-LD
//!
//! Every field becomes one `icm:PropertyExpectation` on a single
//! `NetworkSlice` target. The comparison operator and the property name
//! are read off the field name: "Delay tolerance" exports as
//! `quan:smaller` on property "Delay". Decoding goes the other way and
//! rebuilds a record the pipeline can repair like any other input.

use crate::data_model::{Field, IngestError, RawValue, Record};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// JSON-LD context of the TM Forum intent ontology
pub const ICM_CONTEXT: &str = "http://tio.models.tmforum.org/tio/v3.6.0/context.json";

const INTENT_TYPE: &str = "icm:Intent";
const EXPECTATION_TYPE: &str = "icm:PropertyExpectation";
const TARGET_TYPE: &str = "icm:Target";
const CONDITION_TYPE: &str = "log:Condition";
const TARGET_RESOURCE: &str = "NetworkSlice";

/// Name words that make a field an upper bound
const UPPER_BOUND_WORDS: &[&str] = &["maximum", "max", "tolerance", "delay", "latency"];

/// Name words that make a field a lower bound
const LOWER_BOUND_WORDS: &[&str] = &["minimum", "min", "guaranteed", "bandwidth"];

/// Trailing qualifiers dropped from a field name to get the property name
const QUALIFIER_SUFFIXES: &[&str] = &[" tolerance", " guaranteed", " minimum", " maximum"];

/// Leading qualifier dropped from a field name; decoding puts it back on lower bounds
const GUARANTEED_PREFIX: &str = "guaranteed ";

/// Quantity comparison of an expectation condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IcmOperator {
    Smaller,
    Greater,
    Equal,
}

impl IcmOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            IcmOperator::Smaller => "quan:smaller",
            IcmOperator::Greater => "quan:greater",
            IcmOperator::Equal => "quan:equal",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "quan:smaller" => Some(IcmOperator::Smaller),
            "quan:greater" => Some(IcmOperator::Greater),
            "quan:equal" => Some(IcmOperator::Equal),
            _ => None,
        }
    }

    /// Upper-bound words win over lower-bound ones; matched on whole words
    pub fn infer(field_name: &str) -> Self {
        let lowered = field_name.to_lowercase();
        let words: Vec<&str> = lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
        let has_any = |keywords: &[&str]| words.iter().any(|w| keywords.contains(w));

        if has_any(UPPER_BOUND_WORDS) {
            IcmOperator::Smaller
        } else if has_any(LOWER_BOUND_WORDS) {
            IcmOperator::Greater
        } else {
            IcmOperator::Equal
        }
    }
}

/// Property name for a field name: trailing qualifiers stripped in order,
/// then a leading "Guaranteed", then surrounding whitespace
pub fn property_name(field_name: &str) -> &str {
    let mut name = field_name;
    for suffix in QUALIFIER_SUFFIXES {
        if let Some(cut) = name.len().checked_sub(suffix.len()) {
            if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(suffix) {
                name = &name[..cut];
            }
        }
    }
    let prefix = GUARANTEED_PREFIX.len();
    if name.len() > prefix && name.is_char_boundary(prefix) && name[..prefix].eq_ignore_ascii_case(GUARANTEED_PREFIX) {
        name = &name[prefix..];
    }
    name.trim()
}

/// Field name rebuilt from an operator and a property name
pub fn field_name(operator: IcmOperator, property: &str) -> String {
    match operator {
        IcmOperator::Smaller => format!("{} tolerance", property),
        IcmOperator::Greater => format!("Guaranteed {}", property.to_lowercase()),
        IcmOperator::Equal => property.to_string(),
    }
}

/// Record → ICM encoder. Identifiers keep counting across calls, so every
/// intent, target and expectation exported by one encoder is unique.
#[derive(Debug, Default)]
pub struct IcmEncoder {
    intents: AtomicU64,
    targets: AtomicU64,
    expectations: AtomicU64,
}

impl IcmEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&self, record: &Record) -> Value {
        let intent_id = format!("#intent-{}", next(&self.intents));
        let target_id = format!("#target-{}", next(&self.targets));

        let expectations: Vec<Value> = record.fields.iter().map(|field| self.expectation(field, &target_id)).collect();

        json!({
            "@context": ICM_CONTEXT,
            "@type": INTENT_TYPE,
            "@id": intent_id,
            "name": record.name.as_deref().unwrap_or_default(),
            "description": record.description.as_deref().unwrap_or_default(),
            "hasExpectation": expectations,
            "target": [{
                "@id": target_id,
                "@type": TARGET_TYPE,
                "resourceType": TARGET_RESOURCE,
            }],
        })
    }

    fn expectation(&self, field: &Field, target_id: &str) -> Value {
        let name = field.name.as_deref().unwrap_or_default();
        let operator = IcmOperator::infer(name);
        let (value, unit) = match &field.value {
            Some(v) => (export_value(&v.value), v.unit.as_deref().unwrap_or_default()),
            None => (Value::String(String::new()), ""),
        };

        let mut condition = Map::new();
        condition.insert("@type".to_string(), Value::String(CONDITION_TYPE.to_string()));
        condition.insert(
            operator.as_str().to_string(),
            json!({
                "property": property_name(name),
                "value": { "@value": value, "quan:unit": unit },
            }),
        );

        json!({
            "@type": EXPECTATION_TYPE,
            "@id": format!("#expectation-{}", next(&self.expectations)),
            "target": { "@id": target_id },
            "expectationCondition": Value::Object(condition),
        })
    }
}

fn next(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

/// Numbers in text are exported as numbers: integers when there is no '.'
fn export_value(value: &RawValue) -> Value {
    match value {
        RawValue::Text(s) if !s.contains('.') => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(s.clone())),
        RawValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(s.clone())),
        other => other.to_json(),
    }
}

/// ICM → record. Only property expectations are read; for each, the first
/// `quan:*` condition (in key order) names the field. Values come back as
/// text with their unit, ready for type correction.
pub fn decode(intent: &Value) -> Result<Record, IngestError> {
    let obj = match intent {
        Value::Object(obj) => obj,
        other => return Err(IngestError::NotAnObject(RawValue::from(other.clone()).tag())),
    };
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

    let fields = obj
        .get("hasExpectation")
        .and_then(Value::as_array)
        .map(|expectations| expectations.iter().filter_map(decode_expectation).collect())
        .unwrap_or_default();

    Ok(Record {
        name: text("name"),
        description: text("description"),
        fields,
        shape_errors: Vec::new(),
    })
}

fn decode_expectation(expectation: &Value) -> Option<Field> {
    if expectation.get("@type").and_then(Value::as_str) != Some(EXPECTATION_TYPE) {
        return None;
    }
    let condition = expectation.get("expectationCondition")?.as_object()?;
    let (operator, body) = condition
        .iter()
        .find(|(key, _)| key.starts_with("quan:"))
        .map(|(key, body)| (IcmOperator::parse(key).unwrap_or(IcmOperator::Equal), body))?;

    let property = body.get("property").and_then(Value::as_str).unwrap_or_default();
    let name = field_name(operator, property);
    if name.is_empty() {
        return None;
    }

    let quantity = body.get("value");
    let value = match quantity.and_then(|q| q.get("@value")) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    let unit = quantity
        .and_then(|q| q.get("quan:unit"))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty());

    Some(Field::new(name, RawValue::Text(value), unit))
}
