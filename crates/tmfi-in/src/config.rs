//! Repair configuration.
//!
//! Immutable values handed to the reconciler and corrector at construction.
//! Every section deserializes from YAML with `#[serde(default)]`, so an
//! empty section reproduces the built-in behaviour.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tmfi_core::UnitSynonyms;

lazy_static! {
    /// Names generators commonly produce, mapped to catalog names
    static ref DEFAULT_SYNONYMS: HashMap<String, String> = {
        let mut m = HashMap::new();
        let latency = "Delay tolerance";
        let downlink = "Downlink throughput per network slice: Maximum downlink throughput";
        let availability = "Availability";
        let users = "Number of UEs per network slice";
        for alias in ["E2E latency", "E2E Latency", "End-to-end latency", "Latency", "Network latency"] {
            m.insert(alias.to_string(), latency.to_string());
        }
        for alias in ["Bandwidth", "Throughput", "Data rate"] {
            m.insert(alias.to_string(), downlink.to_string());
        }
        for alias in ["Uptime", "Reliability", "Service availability"] {
            m.insert(alias.to_string(), availability.to_string());
        }
        for alias in ["Number of users", "User count", "Concurrent users"] {
            m.insert(alias.to_string(), users.to_string());
        }
        m
    };
}

/// How the last-resort containment step compares names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// One name's words appear as a contiguous run in the other's
    WholeWord,
    /// Plain case-insensitive substring
    Substring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Minimum similarity ratio for a fuzzy match (0.0 to 1.0)
    pub threshold: f64,
    /// Containment only counts when the shorter name is longer than this
    pub min_containment_len: usize,
    pub containment: ContainmentMode,
    /// Declared name -> catalog name
    pub synonyms: HashMap<String, String>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            min_containment_len: 3,
            containment: ContainmentMode::WholeWord,
            synonyms: DEFAULT_SYNONYMS.clone(),
        }
    }
}

impl ReconcilerConfig {
    pub fn with_synonym(mut self, declared: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.synonyms.insert(declared.into(), canonical.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_containment(mut self, mode: ContainmentMode) -> Self {
        self.containment = mode;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorConfig {
    /// Text read as `true` for BINARY fields (compared lowercased)
    pub affirmative: Vec<String>,
    /// Text read as `false` for BINARY fields (compared lowercased)
    pub negative: Vec<String>,
    pub unit_synonyms: UnitSynonyms,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect();
        Self {
            affirmative: words(&["supported", "yes", "true", "enabled", "available", "1"]),
            negative: words(&["not supported", "no", "false", "disabled", "unavailable", "0"]),
            unit_synonyms: UnitSynonyms::default(),
        }
    }
}
