use std::sync::Arc;
use tmfi_core::{CorrectionLog, Record, RunContext, Stage, StageError};
use tmfi_in::TypeCorrector;
use tmfi_registry::Registry;

/// Coerces values and units of catalog fields
pub struct CorrectStage {
    corrector: TypeCorrector,
    registry: Arc<Registry>,
}

impl CorrectStage {
    pub fn new(corrector: TypeCorrector, registry: Arc<Registry>) -> Self {
        Self { corrector, registry }
    }
}

impl Stage for CorrectStage {
    fn id(&self) -> &'static str {
        "correct.values.v1"
    }

    fn run(&self, record: &mut Record, log: &mut CorrectionLog, _ctx: &RunContext) -> Result<(), StageError> {
        self.corrector.correct_record(record, &self.registry, log);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmfi_core::{Field, RawValue};
    use tmfi_registry::{FieldSpec, ValueType};

    #[test]
    fn test_second_run_changes_nothing() {
        let registry = Arc::new(Registry::from_specs(vec![FieldSpec::new(
            "Area of service",
            ValueType::Set,
            None,
        )]));
        let stage = CorrectStage::new(TypeCorrector::default(), registry);
        let mut record = Record::new("T", "T", vec![Field::new("Area of service", RawValue::from("DE, FR"), None)]);
        let mut log = CorrectionLog::new();
        let ctx = RunContext::new();

        stage.run(&mut record, &mut log, &ctx).unwrap();
        assert_eq!(log.len(), 1);

        let once = record.clone();
        stage.run(&mut record, &mut log, &ctx).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(record, once);
    }
}
