//! Semantic check: does the record say what the scenario asked for?
//!
//! Two heuristic layers over the scenario text:
//! 1. value matching: every quantity stated in the scenario (latency,
//!    bandwidth, availability, users, throughput) must show up in the
//!    record within a relative tolerance, with its unit somewhere in it.
//! 2. completeness: the number of fields is compared with the number of
//!    requirement phrases in the scenario.
//!
//! The result is advisory. It never changes the validator's verdict.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tmfi_core::Record;

lazy_static! {
    /// Quantities a scenario can state, each as (value, unit)
    static ref REQUIREMENTS: Vec<(&'static str, Regex)> = vec![
        ("latency", Regex::new(r"(?i)<?\s*(\d+\.?\d*)\s*(ms|milliseconds?|msec)").unwrap()),
        ("bandwidth", Regex::new(r"(?i)(\d+\.?\d*)\s*(Mbps|Gbps|kbps)").unwrap()),
        ("availability", Regex::new(r"(?i)(\d+\.?\d*)\s*(%)").unwrap()),
        ("users", Regex::new(r"(?i)(\d+)\s*(users?|UEs?)").unwrap()),
        ("throughput", Regex::new(r"(?i)(\d+\.?\d*)\s*(Mbps|Gbps|kbps)").unwrap()),
    ];

    /// Phrases that each count as one requirement
    static ref INDICATORS: Vec<Regex> = [
        r"(?i)<\s*\d+",
        r"(?i)\d+\s*(Mbps|Gbps|kbps)",
        r"(?i)\d+\.?\d+\s*%",
        r"(?i)\blow\s+latency\b",
        r"(?i)\bhigh\s+bandwidth\b",
        r"(?i)\bultra-?reliable\b",
        r"(?i)\bmission\s+critical\b",
        r"(?i)\benergy\s+efficien",
        r"(?i)\bcoverage\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref NUMBER: Regex = Regex::new(r"\d+\.?\d*").unwrap();
}

/// Scores from both layers plus the requirement labels behind them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticReport {
    pub semantic_valid: bool,
    pub value_match_score: f64,
    pub completeness_score: f64,
    pub overall_score: f64,
    /// Requirements found in the record, as `kind:valueunit`
    pub matched: Vec<String>,
    /// Requirements the record does not carry
    pub missing: Vec<String>,
    pub errors: Vec<String>,
}

/// Scenario-versus-record checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticCheck {
    /// Relative difference under which two numbers are the same value
    pub tolerance: f64,
    /// Overall score a record must exceed to be semantically valid
    pub pass_threshold: f64,
}

impl Default for SemanticCheck {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            pass_threshold: 0.8,
        }
    }
}

impl SemanticCheck {
    pub fn evaluate(&self, scenario: &str, record: &Record) -> SemanticReport {
        let intent = record.to_json().to_string().to_lowercase();
        let numbers: Vec<f64> = NUMBER
            .find_iter(&intent)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .collect();

        let mut matched = Vec::new();
        let mut missing = Vec::new();
        for (kind, pattern) in REQUIREMENTS.iter() {
            for caps in pattern.captures_iter(scenario) {
                let (value, unit) = (&caps[1], &caps[2]);
                let label = format!("{}:{}{}", kind, value, unit);
                if self.carries(value, unit, &intent, &numbers) {
                    matched.push(label);
                } else {
                    missing.push(label);
                }
            }
        }

        let total = matched.len() + missing.len();
        let value_match_score = if total == 0 {
            1.0
        } else {
            matched.len() as f64 / total as f64
        };
        let completeness_score = completeness(count_requirements(scenario), record.fields.len());
        let overall_score = 0.5 * value_match_score + 0.5 * completeness_score;
        let errors = missing.iter().map(|label| format!("Missing value: {}", label)).collect();

        tracing::debug!(
            matched = matched.len(),
            missing = missing.len(),
            completeness = completeness_score,
            overall = overall_score,
            "semantic check"
        );

        SemanticReport {
            semantic_valid: overall_score > self.pass_threshold,
            value_match_score,
            completeness_score,
            overall_score,
            matched,
            missing,
            errors,
        }
    }

    /// A number within tolerance of `value`, and `unit` anywhere in the record
    fn carries(&self, value: &str, unit: &str, intent: &str, numbers: &[f64]) -> bool {
        let Ok(expected) = value.parse::<f64>() else {
            return intent.contains(&value.to_lowercase()) && intent.contains(&unit.to_lowercase());
        };
        let close = numbers
            .iter()
            .any(|n| (n - expected).abs() / expected.max(1.0) < self.tolerance);
        close && intent.contains(&unit.to_lowercase())
    }
}

/// Requirement phrases in the scenario, at least one
fn count_requirements(scenario: &str) -> usize {
    INDICATORS
        .iter()
        .map(|re| re.find_iter(scenario).count())
        .sum::<usize>()
        .max(1)
}

fn completeness(expected: usize, actual: usize) -> f64 {
    if expected == 0 {
        return 1.0;
    }
    let ratio = actual as f64 / expected as f64;
    if (0.8..=1.5).contains(&ratio) {
        1.0
    } else if ratio >= 0.5 {
        0.7
    } else if ratio > 0.0 {
        0.3
    } else {
        0.0
    }
}
