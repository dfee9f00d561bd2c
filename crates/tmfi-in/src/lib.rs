//! TMFI-IN: from generator text to a catalog-aligned record
//!
//! This crate holds the input side of the pipeline: the extractor that
//! finds a record in free-form text, the name reconciler and the type and
//! unit corrector. None of them fail on bad data; they repair what they can
//! and leave the rest for the validator.
//!
//! # Example
//!
//! ```ignore
//! use tmfi_in::{extract, repair, NameReconciler, TypeCorrector};
//!
//! let mut record = extract(llm_output)?;
//! let report = repair(&mut record, &registry, &NameReconciler::default(), &TypeCorrector::default());
//! for correction in report.corrections.iter() {
//!     println!("{}", correction);
//! }
//! ```

pub mod config;
pub mod corrector;
pub mod extractor;
pub mod normalizer;
pub mod reconciler;
pub mod similarity;

pub use config::{ContainmentMode, CorrectorConfig, ReconcilerConfig};
pub use corrector::TypeCorrector;
pub use extractor::{extract, extract_with_strategy, Extraction, ExtractionFailure, ParseError, Strategy};
pub use reconciler::{MatchMethod, NameReconciler, Resolution};

use serde::Serialize;
use tmfi_core::{CorrectionLog, Record};
use tmfi_registry::Registry;

/// What a repair pass did to one record
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    pub corrections: CorrectionLog,
    /// Declared names the reconciler could not place in the catalog
    pub unresolved: Vec<String>,
}

/// Reconcile names, then correct values, in place
pub fn repair(
    record: &mut Record,
    registry: &Registry,
    reconciler: &NameReconciler,
    corrector: &TypeCorrector,
) -> RepairReport {
    let mut corrections = CorrectionLog::new();
    let unresolved = reconciler.reconcile_record(record, registry, &mut corrections);
    corrector.correct_record(record, registry, &mut corrections);
    RepairReport { corrections, unresolved }
}
