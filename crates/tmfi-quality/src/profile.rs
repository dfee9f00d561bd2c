//! Plausibility profiles
//!
//! Bounds used by the plausibility check. Violations are warnings only, so
//! a profile never changes whether a record is valid.

use serde::{Deserialize, Serialize};

/// Numeric sanity bounds per quantity, in canonical units (kbps, ms, percent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlausibilityBounds {
    /// Profile name (e.g., "standard@1.0")
    pub name: String,

    // === Percentages ===
    pub percent_min: f64,
    pub percent_max: f64,

    // === Bandwidth / throughput (kbps) ===
    pub bandwidth_min_kbps: f64,
    pub bandwidth_max_kbps: f64,

    // === Latency / delay (ms) ===
    pub latency_min_ms: f64,
    pub latency_max_ms: f64,
}

impl PlausibilityBounds {
    /// 0-100 %, 1 kbps to 10 Tbps, 1 us to 10 s
    pub fn standard() -> Self {
        Self {
            name: "standard@1.0".to_string(),
            percent_min: 0.0,
            percent_max: 100.0,
            bandwidth_min_kbps: 1.0,
            bandwidth_max_kbps: 10_000_000_000.0,
            latency_min_ms: 0.001,
            latency_max_ms: 10_000.0,
        }
    }

    /// Tighter ceilings: 1 Tbps and a 0.1 ms latency floor
    pub fn strict() -> Self {
        Self {
            name: "strict@1.0".to_string(),
            bandwidth_max_kbps: 1_000_000_000.0,
            latency_min_ms: 0.1,
            ..Self::standard()
        }
    }

    /// Load profile from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    /// Get profile by mode name
    pub fn for_mode(mode: &str) -> Self {
        match mode {
            "strict" => Self::strict(),
            _ => Self::standard(),
        }
    }
}

impl Default for PlausibilityBounds {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_bounds() {
        let bounds = PlausibilityBounds::standard();
        assert_eq!(bounds.percent_max, 100.0);
        assert_eq!(bounds.bandwidth_max_kbps, 1e10);
        assert_eq!(bounds.latency_min_ms, 0.001);
    }

    #[test]
    fn test_strict_tightens() {
        let strict = PlausibilityBounds::for_mode("strict");
        assert_eq!(strict.bandwidth_max_kbps, 1e9);
        assert_eq!(strict.latency_min_ms, 0.1);
        assert_eq!(strict.latency_max_ms, 10_000.0);
    }

    #[test]
    fn test_yaml_overrides_some_fields() {
        let bounds = PlausibilityBounds::from_yaml("name: custom\nlatency_max_ms: 500\n").unwrap();
        assert_eq!(bounds.name, "custom");
        assert_eq!(bounds.latency_max_ms, 500.0);
        assert_eq!(bounds.percent_min, 0.0);
    }
}
