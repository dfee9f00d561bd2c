//! TMFI Quality: validation and batch scoring
//!
//! This crate judges records; it never repairs them. The validator turns a
//! record into a [`Verdict`](tmfi_core::Verdict), and the aggregator turns a
//! batch of verdicts into rates. [`SemanticCheck`] compares a record with
//! the scenario it was generated from.
//!
//! # Example
//!
//! ```ignore
//! use tmfi_quality::{CostMetrics, Sample, ScoringAggregator, Validator};
//!
//! let validator = Validator::for_mode("standard");
//! let mut scores = ScoringAggregator::new();
//!
//! for (record, cost) in batch {
//!     scores.add(Sample::validated(validator.validate(&record, &registry), cost));
//! }
//!
//! let summary = scores.summary();
//! println!("accuracy: {:.1}%", summary.accuracy * 100.0);
//! ```

pub mod categories;
pub mod checks;
pub mod metrics;
pub mod profile;
pub mod semantic;
pub mod validator;

pub use categories::ErrorCategory;
pub use checks::{Check, CheckStatus, Quantity};
pub use metrics::{CostMetrics, Sample, ScoreSummary, ScoringAggregator};
pub use profile::PlausibilityBounds;
pub use semantic::{SemanticCheck, SemanticReport};
pub use validator::{ValidationReport, Validator};

use tmfi_core::{Record, Verdict};
use tmfi_registry::Registry;

/// Quick validation with the standard profile
pub fn validate(record: &Record, registry: &Registry) -> Verdict {
    Validator::default().validate(record, registry)
}
