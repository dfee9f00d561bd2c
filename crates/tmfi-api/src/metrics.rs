//! Prometheus metrics served on `/metrics`
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use tmfi_stages::PipelineOutcome;

pub struct ApiMetrics {
    registry: Registry,
    records: IntCounterVec,
    corrections: IntCounterVec,
    processing_seconds: Histogram,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let records = IntCounterVec::new(
            Opts::new("tmfi_records_total", "Records processed, by result"),
            &["result"],
        )?;
        let corrections = IntCounterVec::new(
            Opts::new("tmfi_corrections_total", "Corrections applied, by kind"),
            &["kind"],
        )?;
        let processing_seconds = Histogram::with_opts(HistogramOpts::new(
            "tmfi_processing_seconds",
            "Time spent in the pipeline per request",
        ))?;

        registry.register(Box::new(records.clone()))?;
        registry.register(Box::new(corrections.clone()))?;
        registry.register(Box::new(processing_seconds.clone()))?;

        Ok(Self {
            registry,
            records,
            corrections,
            processing_seconds,
        })
    }

    pub fn observe_outcome(&self, outcome: &PipelineOutcome) {
        let result = if outcome.verdict().overall_valid() { "valid" } else { "invalid" };
        self.records.with_label_values(&[result]).inc();

        let summary = &outcome.correction_summary;
        for (kind, count) in [
            ("name", summary.name_corrections),
            ("type", summary.type_corrections),
            ("unit", summary.unit_corrections),
        ] {
            if count > 0 {
                self.corrections.with_label_values(&[kind]).inc_by(count as u64);
            }
        }
    }

    pub fn observe_failure(&self, result: &str) {
        self.records.with_label_values(&[result]).inc();
    }

    pub fn observe_duration(&self, seconds: f64) {
        self.processing_seconds.observe(seconds);
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
