//! Pipeline Runner: chains stages over one record and records a proof per stage
use crate::context::RunContext;
use crate::data_model::{CorrectionLog, Record, StageProof};
use crate::error::TmfiError;
use crate::stage::{Stage, StageError};
use std::time::Instant;

pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
    pipeline_id: String,
}

impl PipelineRunner {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        let pipeline_id = stages
            .iter()
            .map(|s| s.id().split('.').next().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("→");

        Self { stages, pipeline_id }
    }

    pub fn run(
        &self,
        record: &mut Record,
        log: &mut CorrectionLog,
        ctx: &RunContext,
    ) -> Result<Vec<StageProof>, TmfiError> {
        let mut proofs = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let start = Instant::now();
            let in_hash = hash_record(record)?;
            let before = log.len();

            let replay = (ctx.verify_determinism && stage.deterministic()).then(|| record.clone());

            stage
                .run(record, log, ctx)
                .map_err(|e| TmfiError::StageError(e.to_string()))?;

            let out_hash = hash_record(record)?;

            if let Some(mut replay) = replay {
                let mut scratch = CorrectionLog::new();
                stage
                    .run(&mut replay, &mut scratch, ctx)
                    .map_err(|e| TmfiError::StageError(e.to_string()))?;
                let replay_hash = hash_record(&replay)?;
                if replay_hash != out_hash {
                    let err = StageError::Determinism(format!(
                        "{} produced {} then {}",
                        stage.id(),
                        out_hash,
                        replay_hash
                    ));
                    return Err(TmfiError::StageError(err.to_string()));
                }
            }

            let proof = StageProof {
                id: stage.id().to_string(),
                in_hash,
                out_hash,
                deterministic: stage.deterministic(),
                latency_us: start.elapsed().as_micros() as u64,
                corrections: log.len() - before,
            };
            tracing::debug!(
                trace_id = %ctx.trace_id,
                stage = %proof.id,
                corrections = proof.corrections,
                changed = proof.changed(),
                "stage finished"
            );
            proofs.push(proof);
        }

        Ok(proofs)
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// `blake3:<hex>` digest of arbitrary bytes
pub fn content_hash(data: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(data))
}

fn hash_record(record: &Record) -> Result<String, TmfiError> {
    let bytes = serde_json::to_vec(record)?;
    Ok(content_hash(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{Correction, CorrectionKind, Field, RawValue};

    struct Uppercase;

    impl Stage for Uppercase {
        fn id(&self) -> &'static str {
            "upper.names.v1"
        }

        fn run(&self, record: &mut Record, log: &mut CorrectionLog, _ctx: &RunContext) -> Result<(), StageError> {
            for field in &mut record.fields {
                if let Some(name) = field.name.as_mut() {
                    let upper = name.to_uppercase();
                    if upper != *name {
                        log.push(Correction::new(
                            name.clone(),
                            CorrectionKind::Name,
                            RawValue::Text(name.clone()),
                            RawValue::Text(upper.clone()),
                        ));
                        *name = upper;
                    }
                }
            }
            Ok(())
        }
    }

    struct Noop;

    impl Stage for Noop {
        fn id(&self) -> &'static str {
            "noop.v1"
        }

        fn run(&self, _: &mut Record, _: &mut CorrectionLog, _: &RunContext) -> Result<(), StageError> {
            Ok(())
        }
    }

    fn sample() -> Record {
        Record::new("r", "d", vec![Field::new("latency", RawValue::Integer(5), Some("ms"))])
    }

    #[test]
    fn test_pipeline_id() {
        let runner = PipelineRunner::new(vec![Box::new(Uppercase), Box::new(Noop)]);
        assert_eq!(runner.pipeline_id(), "upper→noop");
        assert_eq!(runner.len(), 2);
    }

    #[test]
    fn test_proofs_track_changes() {
        let runner = PipelineRunner::new(vec![Box::new(Uppercase), Box::new(Noop)]);
        let mut record = sample();
        let mut log = CorrectionLog::new();
        let proofs = runner.run(&mut record, &mut log, &RunContext::new()).unwrap();

        assert_eq!(proofs.len(), 2);
        assert!(proofs[0].changed());
        assert_eq!(proofs[0].corrections, 1);
        assert!(!proofs[1].changed());
        assert_eq!(proofs[0].out_hash, proofs[1].in_hash);
        assert_eq!(record.fields[0].name.as_deref(), Some("LATENCY"));
    }

    #[test]
    fn test_determinism_replay_passes_for_pure_stage() {
        let runner = PipelineRunner::new(vec![Box::new(Uppercase)]);
        let mut record = sample();
        let mut log = CorrectionLog::new();
        let ctx = RunContext::new().verifying_determinism();
        assert!(runner.run(&mut record, &mut log, &ctx).is_ok());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_content_hash_prefix() {
        assert!(content_hash(b"abc").starts_with("blake3:"));
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
    }
}
