//! Unit label equivalence.
//!
//! Unit labels are compared case-insensitively; labels in the same group
//! are interchangeable. Everything else must match exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitSynonyms {
    groups: Vec<Vec<String>>,
}

impl Default for UnitSynonyms {
    fn default() -> Self {
        Self::from_groups(&[
            &["%", "percent", "percentage"],
            &["ms", "millisecond", "milliseconds", "msec"],
        ])
    }
}

impl UnitSynonyms {
    pub fn from_groups(groups: &[&[&str]]) -> Self {
        Self {
            groups: groups
                .iter()
                .map(|g| g.iter().map(|u| u.to_string()).collect())
                .collect(),
        }
    }

    /// Comparison key: the lowercased first label of the unit's group, or
    /// the lowercased unit itself when it belongs to no group.
    pub fn canonical_key(&self, unit: &str) -> String {
        let lowered = unit.trim().to_lowercase();
        self.groups
            .iter()
            .find(|g| g.iter().any(|u| u.to_lowercase() == lowered))
            .and_then(|g| g.first())
            .map(|u| u.to_lowercase())
            .unwrap_or(lowered)
    }

    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        self.canonical_key(a) == self.canonical_key(b)
    }

    /// True when `unit` is a recognised percentage label
    pub fn is_percent(&self, unit: &str) -> bool {
        self.equivalent(unit, "%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_are_equivalent() {
        let units = UnitSynonyms::default();
        assert!(units.equivalent("percent", "%"));
        assert!(units.equivalent("Percentage", "PERCENT"));
        assert!(units.equivalent("msec", "ms"));
        assert!(units.equivalent("MS", "Milliseconds"));
    }

    #[test]
    fn test_unrelated_units_differ() {
        let units = UnitSynonyms::default();
        assert!(!units.equivalent("ms", "s"));
        assert!(!units.equivalent("kbps", "Mbps"));
        assert!(units.equivalent("Mbps", "mbps"));
    }
}
