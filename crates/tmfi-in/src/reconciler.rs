//! Name reconciliation for TMFI-IN.
//!
//! Maps a declared field name onto a catalog name with a tiered cascade:
//! exact, synonym, fuzzy, containment. The first tier that yields a name wins.

use crate::config::{ContainmentMode, ReconcilerConfig};
use crate::normalizer::{contains_words, normalize_name, words};
use crate::similarity::ratio;
use serde::Serialize;
use tmfi_core::{Correction, CorrectionKind, CorrectionLog, RawValue, Record};
use tmfi_registry::Registry;

/// Which tier of the cascade produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Synonym,
    Fuzzy { score: f64 },
    Containment,
}

/// Outcome of reconciling one declared name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Catalog name, or `None` when the field is unresolvable
    pub resolved: Option<String>,
    /// The resolved name differs from the declared one
    pub corrected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MatchMethod>,
}

impl Resolution {
    fn unresolved() -> Self {
        Self {
            resolved: None,
            corrected: false,
            method: None,
        }
    }

    fn to(declared: &str, resolved: &str, method: MatchMethod) -> Self {
        Self {
            resolved: Some(resolved.to_string()),
            corrected: declared != resolved,
            method: Some(method),
        }
    }
}

/// Reconciles declared names against a registry. Holds only immutable configuration.
#[derive(Debug, Clone, Default)]
pub struct NameReconciler {
    config: ReconcilerConfig,
}

impl NameReconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Resolve one declared name
    pub fn reconcile(&self, declared: &str, registry: &Registry) -> Resolution {
        if registry.contains(declared) {
            return Resolution::to(declared, declared, MatchMethod::Exact);
        }

        if let Some(target) = self.config.synonyms.get(declared) {
            if registry.contains(target) {
                return Resolution::to(declared, target, MatchMethod::Synonym);
            }
            tracing::debug!(declared, target = %target, "synonym target not in catalog");
        }

        if let Some((name, score)) = self.closest(declared, registry) {
            return Resolution::to(declared, name, MatchMethod::Fuzzy { score });
        }

        if let Some(name) = self.containing(declared, registry) {
            return Resolution::to(declared, name, MatchMethod::Containment);
        }

        Resolution::unresolved()
    }

    /// Rename every resolvable field in place, logging NAME corrections.
    /// Returns the declared names that could not be resolved.
    pub fn reconcile_record(&self, record: &mut Record, registry: &Registry, log: &mut CorrectionLog) -> Vec<String> {
        let mut unresolved = Vec::new();

        for field in record.fields.iter_mut() {
            let Some(declared) = field.name.as_deref() else {
                continue;
            };

            let resolution = self.reconcile(declared, registry);
            match resolution.resolved {
                Some(resolved) if resolution.corrected => {
                    tracing::debug!(declared, resolved = %resolved, method = ?resolution.method, "field renamed");
                    let original = field.original_name().unwrap_or(declared).to_string();
                    log.push(Correction::new(
                        original.as_str(),
                        CorrectionKind::Name,
                        RawValue::from(declared),
                        RawValue::Text(resolved.clone()),
                    ));
                    field.declared_name.get_or_insert(original);
                    field.name = Some(resolved);
                }
                Some(_) => {}
                None => {
                    tracing::debug!(declared, "field name unresolvable");
                    unresolved.push(declared.to_string());
                }
            }
        }

        unresolved
    }

    /// Best similarity at or above the threshold; ties keep the earlier catalog entry
    fn closest<'r>(&self, declared: &str, registry: &'r Registry) -> Option<(&'r str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for name in registry.names() {
            let score = ratio(declared, name);
            if score < self.config.threshold {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((name, score));
            }
        }
        best
    }

    /// First catalog name that contains, or is contained by, the declared name
    fn containing<'r>(&self, declared: &str, registry: &'r Registry) -> Option<&'r str> {
        let declared_norm = normalize_name(declared);
        let declared_words = words(declared);

        registry.names().find(|name| {
            let name_norm = normalize_name(name);
            let shorter = declared_norm.chars().count().min(name_norm.chars().count());
            if shorter <= self.config.min_containment_len {
                return false;
            }
            match self.config.containment {
                ContainmentMode::Substring => {
                    declared_norm.contains(&name_norm) || name_norm.contains(&declared_norm)
                }
                ContainmentMode::WholeWord => {
                    let name_words = words(name);
                    contains_words(&declared_words, &name_words) || contains_words(&name_words, &declared_words)
                }
            }
        })
    }
}
