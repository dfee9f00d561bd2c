//! Batch scoring
//!
//! Rates over a batch of verdicts plus the generator's cost per item.
//! Items whose text could not be extracted carry no verdict; they count in
//! every denominator and never as valid.

use crate::categories::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tmfi_core::Verdict;

/// Generation cost of one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostMetrics {
    pub tokens: u64,
    pub time_seconds: f64,
}

impl CostMetrics {
    pub fn new(tokens: u64, time_seconds: f64) -> Self {
        Self { tokens, time_seconds }
    }
}

/// One scored item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// `None` when extraction failed
    pub verdict: Option<Verdict>,
    #[serde(default)]
    pub cost: CostMetrics,
}

impl Sample {
    pub fn validated(verdict: Verdict, cost: CostMetrics) -> Self {
        Self {
            verdict: Some(verdict),
            cost,
        }
    }

    pub fn extraction_failed(cost: CostMetrics) -> Self {
        Self { verdict: None, cost }
    }

    fn format_valid(&self) -> bool {
        self.verdict.as_ref().map_or(false, Verdict::format_valid)
    }

    fn overall_valid(&self) -> bool {
        self.verdict.as_ref().map_or(false, Verdict::overall_valid)
    }
}

/// Aggregator for one batch
#[derive(Debug, Clone, Default)]
pub struct ScoringAggregator {
    samples: Vec<Sample>,
}

impl ScoringAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Share of items whose format check passed
    pub fn format_correctness(&self) -> f64 {
        self.fraction(Sample::format_valid)
    }

    /// Share of items that are valid overall
    pub fn accuracy(&self) -> f64 {
        self.fraction(Sample::overall_valid)
    }

    pub fn total_tokens(&self) -> u64 {
        self.samples.iter().map(|s| s.cost.tokens).sum()
    }

    pub fn average_tokens(&self) -> f64 {
        self.mean(self.total_tokens() as f64)
    }

    pub fn total_time_seconds(&self) -> f64 {
        self.samples.iter().map(|s| s.cost.time_seconds).sum()
    }

    pub fn average_time_seconds(&self) -> f64 {
        self.mean(self.total_time_seconds())
    }

    pub fn extraction_failures(&self) -> usize {
        self.samples.iter().filter(|s| s.verdict.is_none()).count()
    }

    /// Error count per category; an extraction failure counts once
    pub fn error_histogram(&self) -> BTreeMap<ErrorCategory, usize> {
        let mut histogram = BTreeMap::new();
        for sample in &self.samples {
            match &sample.verdict {
                None => *histogram.entry(ErrorCategory::JsonExtractionFailure).or_insert(0) += 1,
                Some(verdict) => {
                    for error in verdict.errors() {
                        *histogram.entry(ErrorCategory::classify(error)).or_insert(0) += 1;
                    }
                }
            }
        }
        histogram
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            num_results: self.count(),
            format_correctness: self.format_correctness(),
            accuracy: self.accuracy(),
            cost_avg_tokens: self.average_tokens(),
            cost_total_tokens: self.total_tokens(),
            inference_time_avg_seconds: self.average_time_seconds(),
            inference_time_total_seconds: self.total_time_seconds(),
            extraction_failures: self.extraction_failures(),
            error_categories: self.error_histogram(),
        }
    }

    fn fraction(&self, pred: impl Fn(&Sample) -> bool) -> f64 {
        let hits = self.samples.iter().filter(|s| pred(*s)).count();
        self.mean(hits as f64)
    }

    fn mean(&self, total: f64) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            total / self.samples.len() as f64
        }
    }
}

impl Extend<Sample> for ScoringAggregator {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        self.samples.extend(iter);
    }
}

impl FromIterator<Sample> for ScoringAggregator {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Summary of a scored batch. Rates are fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub num_results: usize,
    pub format_correctness: f64,
    pub accuracy: f64,
    pub cost_avg_tokens: f64,
    pub cost_total_tokens: u64,
    pub inference_time_avg_seconds: f64,
    pub inference_time_total_seconds: f64,
    pub extraction_failures: usize,
    pub error_categories: BTreeMap<ErrorCategory, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Verdict {
        Verdict::compose(vec![], vec![], vec!["Availability: Percentage value 150 out of range [0, 100]".into()])
    }

    fn bad_catalog() -> Verdict {
        Verdict::compose(
            vec![],
            vec![
                "Characteristic 'Quantum flux' not found in specification".into(),
                "Delay tolerance: Unit 's' doesn't match specification unit 'ms'".into(),
            ],
            vec![],
        )
    }

    fn bad_format() -> Verdict {
        Verdict::compose(vec!["Missing required field: 'name'".into()], vec![], vec![])
    }

    #[test]
    fn test_empty_batch_is_all_zero() {
        let summary = ScoringAggregator::new().summary();
        assert_eq!(summary.num_results, 0);
        assert_eq!(summary.format_correctness, 0.0);
        assert_eq!(summary.accuracy, 0.0);
        assert_eq!(summary.cost_avg_tokens, 0.0);
        assert_eq!(summary.inference_time_avg_seconds, 0.0);
        assert!(summary.error_categories.is_empty());
    }

    #[test]
    fn test_rates() {
        let agg: ScoringAggregator = vec![
            Sample::validated(valid(), CostMetrics::new(100, 1.0)),
            Sample::validated(bad_catalog(), CostMetrics::new(200, 2.0)),
            Sample::validated(bad_format(), CostMetrics::new(300, 3.0)),
            Sample::extraction_failed(CostMetrics::new(400, 4.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(agg.count(), 4);
        assert_eq!(agg.format_correctness(), 0.5);
        assert_eq!(agg.accuracy(), 0.25);
        assert_eq!(agg.total_tokens(), 1000);
        assert_eq!(agg.average_tokens(), 250.0);
        assert_eq!(agg.average_time_seconds(), 2.5);
        assert_eq!(agg.extraction_failures(), 1);
    }

    #[test]
    fn test_error_histogram() {
        let mut agg = ScoringAggregator::new();
        agg.extend(vec![
            Sample::validated(bad_catalog(), CostMetrics::default()),
            Sample::validated(bad_format(), CostMetrics::default()),
            Sample::extraction_failed(CostMetrics::default()),
        ]);

        let histogram = agg.error_histogram();
        assert_eq!(histogram[&ErrorCategory::WrongCharacteristicName], 1);
        assert_eq!(histogram[&ErrorCategory::WrongUnit], 1);
        assert_eq!(histogram[&ErrorCategory::MissingRequiredField], 1);
        assert_eq!(histogram[&ErrorCategory::JsonExtractionFailure], 1);
        assert!(!histogram.contains_key(&ErrorCategory::WrongValueType));
    }

    #[test]
    fn test_summary_serializes_categories_by_name() {
        let mut agg = ScoringAggregator::new();
        agg.add(Sample::extraction_failed(CostMetrics::default()));
        let json = serde_json::to_value(agg.summary()).unwrap();
        assert_eq!(json["error_categories"]["json_extraction_failure"], 1);
    }
}
