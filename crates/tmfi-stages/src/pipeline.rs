//! End-to-end pipeline: extract → reconcile → correct → validate

use crate::config::PipelineConfig;
use crate::correct::CorrectStage;
use crate::reconcile::ReconcileStage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tmfi_core::{
    content_hash, CorrectionLog, CorrectionSummary, PipelineRunner, Record, RunContext, Stage, StageProof, TmfiError,
    Verdict,
};
use tmfi_in::{extract_with_strategy, ExtractionFailure, NameReconciler, Strategy, TypeCorrector};
use tmfi_quality::{
    CostMetrics, Sample, ScoreSummary, ScoringAggregator, SemanticCheck, SemanticReport, ValidationReport, Validator,
};
use tmfi_registry::Registry;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractionFailure),

    #[error(transparent)]
    Run(#[from] TmfiError),
}

/// Everything the pipeline knows about one processed input
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub trace_id: String,
    pub pipeline_id: String,
    /// Hash of the raw text, or of the wire form for records passed in directly
    pub input_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// Repaired record in wire form
    pub record: Record,
    pub corrections: CorrectionLog,
    pub correction_summary: CorrectionSummary,
    pub stages: Vec<StageProof>,
    pub validation: ValidationReport,
    /// Present when the input came with the scenario it was generated from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticReport>,
}

impl PipelineOutcome {
    pub fn verdict(&self) -> &Verdict {
        &self.validation.verdict
    }
}

/// One batch input: generator text plus what it cost to produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub text: String,
    #[serde(default)]
    pub cost: CostMetrics,
    /// Natural-language request the text answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
}

impl BatchItem {
    pub fn new(text: impl Into<String>, cost: CostMetrics) -> Self {
        Self {
            text: text.into(),
            cost,
            scenario: None,
        }
    }

    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Processed(PipelineOutcome),
    Failed { input_hash: String, error: String },
}

impl BatchEntry {
    pub fn outcome(&self) -> Option<&PipelineOutcome> {
        match self {
            BatchEntry::Processed(outcome) => Some(outcome),
            BatchEntry::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub scores: ScoreSummary,
    pub corrections: CorrectionSummary,
}

/// Shared, read-only pipeline. Safe to use from many threads at once.
pub struct IntentPipeline {
    registry: Arc<Registry>,
    runner: PipelineRunner,
    validator: Validator,
    semantic: SemanticCheck,
    verify_determinism: bool,
}

/// Reconcile then correct, both against `registry`
pub fn default_stages(registry: &Arc<Registry>, config: &PipelineConfig) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(ReconcileStage::new(
            NameReconciler::new(config.reconciler.clone()),
            Arc::clone(registry),
        )),
        Box::new(CorrectStage::new(
            TypeCorrector::new(config.corrector.clone()),
            Arc::clone(registry),
        )),
    ]
}

impl IntentPipeline {
    pub fn new(registry: Arc<Registry>, config: &PipelineConfig) -> Self {
        let runner = PipelineRunner::new(default_stages(&registry, config));
        let validator = Validator::new(config.profile.clone(), config.corrector.unit_synonyms.clone());

        Self {
            registry,
            runner,
            validator,
            semantic: config.semantic.clone(),
            verify_determinism: config.verify_determinism,
        }
    }

    /// Load the catalog named by `config` and build the pipeline
    pub fn from_config(config: &PipelineConfig) -> Result<Self, TmfiError> {
        let registry = Registry::load(&config.catalog).map_err(|e| TmfiError::SpecError(e.to_string()))?;
        Ok(Self::new(Arc::new(registry), config))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn pipeline_id(&self) -> &str {
        self.runner.pipeline_id()
    }

    /// Extract a record from generator text, repair it and validate it
    pub fn process(&self, text: &str) -> Result<PipelineOutcome, PipelineError> {
        self.process_with_scenario(text, None)
    }

    /// As [`process`](Self::process), then score the repaired record against `scenario`
    pub fn process_with_scenario(&self, text: &str, scenario: Option<&str>) -> Result<PipelineOutcome, PipelineError> {
        let input_hash = content_hash(text.as_bytes());
        let extraction = extract_with_strategy(text).map_err(|failure| {
            tracing::debug!(%input_hash, attempts = ?failure.attempts, "no record in input");
            failure
        })?;

        let mut outcome = self.run(extraction.record, input_hash, Some(extraction.strategy))?;
        if let Some(scenario) = scenario {
            outcome.semantic = Some(self.semantic.evaluate(scenario, &outcome.record));
        }
        Ok(outcome)
    }

    /// Repair and validate an already structured record
    pub fn process_record(&self, record: Record) -> Result<PipelineOutcome, TmfiError> {
        let input_hash = content_hash(&serde_json::to_vec(&record)?);
        self.run(record, input_hash, None)
    }

    /// Process every item independently and score the batch
    pub fn process_batch(&self, items: &[BatchItem]) -> BatchReport {
        let mut aggregator = ScoringAggregator::new();
        let mut corrections = CorrectionSummary::default();
        let mut entries = Vec::with_capacity(items.len());

        for item in items {
            match self.process_with_scenario(&item.text, item.scenario.as_deref()) {
                Ok(outcome) => {
                    aggregator.add(Sample::validated(outcome.verdict().clone(), item.cost));
                    corrections.merge(&outcome.correction_summary);
                    entries.push(BatchEntry::Processed(outcome));
                }
                Err(err) => {
                    let input_hash = content_hash(item.text.as_bytes());
                    match &err {
                        PipelineError::Extract(_) => aggregator.add(Sample::extraction_failed(item.cost)),
                        PipelineError::Run(e) => tracing::warn!(%input_hash, error = %e, "item skipped from scoring"),
                    }
                    entries.push(BatchEntry::Failed {
                        input_hash,
                        error: err.to_string(),
                    });
                }
            }
        }

        let scores = aggregator.summary();
        tracing::info!(
            items = scores.num_results,
            accuracy = scores.accuracy,
            format_correctness = scores.format_correctness,
            extraction_failures = scores.extraction_failures,
            corrections = corrections.total,
            "batch scored"
        );

        BatchReport {
            entries,
            scores,
            corrections,
        }
    }

    fn run(&self, mut record: Record, input_hash: String, strategy: Option<Strategy>) -> Result<PipelineOutcome, TmfiError> {
        let mut ctx = RunContext::new();
        if self.verify_determinism {
            ctx = ctx.verifying_determinism();
        }

        let mut corrections = CorrectionLog::new();
        let stages = self.runner.run(&mut record, &mut corrections, &ctx)?;
        let validation = self.validator.evaluate(&record, &self.registry);

        tracing::debug!(
            trace_id = %ctx.trace_id,
            %input_hash,
            corrections = corrections.len(),
            overall_valid = validation.verdict.overall_valid(),
            "record processed"
        );

        Ok(PipelineOutcome {
            trace_id: ctx.trace_id,
            pipeline_id: self.runner.pipeline_id().to_string(),
            input_hash,
            strategy,
            correction_summary: corrections.summary(),
            record,
            corrections,
            stages,
            validation,
            semantic: None,
        })
    }
}
