//! Plausibility checks
//!
//! Soft sanity bounds on numeric values. The quantity a field measures is
//! inferred from keywords in its name (or a percent unit), and the value is
//! scaled to the profile's canonical unit before comparison.

use crate::profile::PlausibilityBounds;
use serde::{Deserialize, Serialize};
use tmfi_core::{FieldValue, UnitSynonyms};
use tmfi_registry::{FieldSpec, ValueType};

/// Single check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl Check {
    pub fn fail(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }

    pub fn warn(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

/// What a numeric field measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Percentage,
    Bandwidth,
    Latency,
    Count,
}

impl Quantity {
    /// Infer from the field name, or from a percent unit
    pub fn infer(name: &str, unit: Option<&str>, units: &UnitSynonyms) -> Option<Self> {
        let lowered = name.to_lowercase();
        let has = |kws: &[&str]| kws.iter().any(|kw| lowered.contains(kw));

        if unit.map_or(false, |u| units.is_percent(u)) || has(&["availability", "reliability"]) {
            Some(Quantity::Percentage)
        } else if has(&["bandwidth", "throughput"]) {
            Some(Quantity::Bandwidth)
        } else if has(&["latency", "delay"]) {
            Some(Quantity::Latency)
        } else if has(&["number", "count", "density"]) {
            Some(Quantity::Count)
        } else {
            None
        }
    }
}

/// Value in kbps, or `None` when the unit gives no scale
fn to_kbps(value: f64, unit: &str) -> Option<f64> {
    let factor = match unit.trim().to_lowercase().as_str() {
        "bps" | "bit/s" => 0.001,
        "kbps" | "kbit/s" => 1.0,
        "mbps" | "mbit/s" => 1_000.0,
        "gbps" | "gbit/s" => 1_000_000.0,
        "tbps" | "tbit/s" => 1_000_000_000.0,
        _ => return None,
    };
    Some(value * factor)
}

/// Value in ms, or `None` when the unit gives no scale
fn to_ms(value: f64, unit: &str, units: &UnitSynonyms) -> Option<f64> {
    if units.equivalent(unit, "ms") {
        return Some(value);
    }
    let factor = match unit.trim().to_lowercase().as_str() {
        "us" | "µs" | "microsecond" | "microseconds" => 0.001,
        "s" | "sec" | "second" | "seconds" => 1_000.0,
        _ => return None,
    };
    Some(value * factor)
}

/// Plausibility warnings for one field.
///
/// Only numeric values are looked at, and only when the field is declared
/// numeric or has no declared type. The supplied unit wins over the catalog
/// unit when scaling.
pub fn plausibility(
    field: &str,
    value: &FieldValue,
    spec: Option<&FieldSpec>,
    bounds: &PlausibilityBounds,
    units: &UnitSynonyms,
) -> Vec<Check> {
    let declared = spec.and_then(|s| s.value_type);
    if declared.map_or(false, |t| !t.is_numeric()) {
        return Vec::new();
    }
    let Some(n) = value.value.as_number() else {
        return Vec::new();
    };
    let unit = value.unit().or_else(|| spec.and_then(|s| s.unit()));
    let Some(quantity) = Quantity::infer(field, unit, units) else {
        return Vec::new();
    };
    let unit_label = unit.unwrap_or("");

    let mut checks = Vec::new();
    match quantity {
        Quantity::Percentage => {
            if n < bounds.percent_min || n > bounds.percent_max {
                checks.push(Check::warn(
                    "percent_range",
                    format!(
                        "{}: Percentage value {} out of range [{}, {}]",
                        field, n, bounds.percent_min, bounds.percent_max
                    ),
                ));
            }
        }
        Quantity::Bandwidth => {
            if n < 0.0 {
                checks.push(Check::warn(
                    "bandwidth_range",
                    format!("{}: Throughput/bandwidth cannot be negative ({})", field, n),
                ));
            } else if let Some(kbps) = unit.and_then(|u| to_kbps(n, u)) {
                if kbps > bounds.bandwidth_max_kbps {
                    checks.push(Check::warn(
                        "bandwidth_range",
                        format!("{}: Unusually high bandwidth {} {}", field, n, unit_label),
                    ));
                } else if kbps < bounds.bandwidth_min_kbps {
                    checks.push(Check::warn(
                        "bandwidth_range",
                        format!("{}: Unusually low bandwidth {} {}", field, n, unit_label),
                    ));
                }
            }
        }
        Quantity::Latency => {
            if n < 0.0 {
                checks.push(Check::warn(
                    "latency_range",
                    format!("{}: Latency/delay cannot be negative ({})", field, n),
                ));
            } else if let Some(ms) = unit.and_then(|u| to_ms(n, u, units)) {
                if ms < bounds.latency_min_ms {
                    checks.push(Check::warn(
                        "latency_range",
                        format!("{}: Unrealistically low latency {} {}", field, n, unit_label),
                    ));
                } else if ms > bounds.latency_max_ms {
                    checks.push(Check::warn(
                        "latency_range",
                        format!("{}: Unusually high latency {} {}", field, n, unit_label),
                    ));
                }
            }
        }
        Quantity::Count => {
            if n < 0.0 {
                checks.push(Check::warn(
                    "count_range",
                    format!("{}: Count cannot be negative ({})", field, n),
                ));
            }
            if declared == Some(ValueType::Integer) && n.fract() != 0.0 {
                checks.push(Check::warn(
                    "count_whole",
                    format!("{}: Count must be whole number, got {}", field, n),
                ));
            }
        }
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmfi_core::RawValue;

    fn warnings(field: &str, value: RawValue, unit: Option<&str>, spec: Option<&FieldSpec>) -> Vec<String> {
        plausibility(
            field,
            &FieldValue::new(value, unit),
            spec,
            &PlausibilityBounds::standard(),
            &UnitSynonyms::default(),
        )
        .into_iter()
        .map(|c| c.message)
        .collect()
    }

    #[test]
    fn test_quantity_inference() {
        let units = UnitSynonyms::default();
        assert_eq!(Quantity::infer("Availability", None, &units), Some(Quantity::Percentage));
        assert_eq!(Quantity::infer("Packet loss", Some("percentage"), &units), Some(Quantity::Percentage));
        assert_eq!(
            Quantity::infer("Downlink throughput per network slice", None, &units),
            Some(Quantity::Bandwidth)
        );
        assert_eq!(Quantity::infer("Delay tolerance", None, &units), Some(Quantity::Latency));
        assert_eq!(Quantity::infer("Terminal density", None, &units), Some(Quantity::Count));
        assert_eq!(Quantity::infer("Isolation level", None, &units), None);
    }

    #[test]
    fn test_percentage_out_of_range() {
        let w = warnings("Availability", RawValue::Float(150.0), Some("%"), None);
        assert_eq!(w, vec!["Availability: Percentage value 150 out of range [0, 100]"]);
        assert!(warnings("Availability", RawValue::Float(99.9), Some("%"), None).is_empty());
    }

    #[test]
    fn test_bandwidth_scaled_by_unit() {
        assert_eq!(warnings("Bandwidth", RawValue::Integer(20_000), Some("Gbps"), None).len(), 1);
        assert!(warnings("Bandwidth", RawValue::Integer(20_000), Some("Mbps"), None).is_empty());
        assert_eq!(
            warnings("Bandwidth", RawValue::Float(0.5), Some("kbps"), None),
            vec!["Bandwidth: Unusually low bandwidth 0.5 kbps"]
        );
        // No scale known: only the sign is checked
        assert!(warnings("Bandwidth", RawValue::Float(0.5), None, None).is_empty());
        assert_eq!(warnings("Bandwidth", RawValue::Integer(-1), None, None).len(), 1);
    }

    #[test]
    fn test_latency_bounds() {
        assert_eq!(
            warnings("Delay tolerance", RawValue::Float(0.0005), Some("ms"), None),
            vec!["Delay tolerance: Unrealistically low latency 0.0005 ms"]
        );
        assert_eq!(warnings("Delay tolerance", RawValue::Integer(20), Some("s"), None).len(), 1);
        assert!(warnings("Delay tolerance", RawValue::Integer(20), Some("msec"), None).is_empty());
    }

    #[test]
    fn test_catalog_unit_used_when_missing() {
        let spec = FieldSpec::new("Delay tolerance", ValueType::Float, Some("ms"));
        assert_eq!(warnings("Delay tolerance", RawValue::Integer(20_000), None, Some(&spec)).len(), 1);
    }

    #[test]
    fn test_counts() {
        let spec = FieldSpec::new("Number of UEs per network slice", ValueType::Integer, None);
        let w = warnings("Number of UEs per network slice", RawValue::Float(-2.5), None, Some(&spec));
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_non_numeric_types_skipped() {
        let spec = FieldSpec::new("Availability notes", ValueType::Text, None);
        assert!(warnings("Availability notes", RawValue::from("500"), None, Some(&spec)).is_empty());
        assert!(warnings("Availability", RawValue::Bool(true), None, None).is_empty());
    }
}
