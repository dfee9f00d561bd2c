use std::sync::Arc;
use tmfi_core::{CorrectionLog, Record, RunContext, Stage, StageError};
use tmfi_in::NameReconciler;
use tmfi_registry::Registry;

/// Renames fields onto catalog names
pub struct ReconcileStage {
    reconciler: NameReconciler,
    registry: Arc<Registry>,
}

impl ReconcileStage {
    pub fn new(reconciler: NameReconciler, registry: Arc<Registry>) -> Self {
        Self { reconciler, registry }
    }
}

impl Stage for ReconcileStage {
    fn id(&self) -> &'static str {
        "reconcile.names.v1"
    }

    fn run(&self, record: &mut Record, log: &mut CorrectionLog, ctx: &RunContext) -> Result<(), StageError> {
        let unresolved = self.reconciler.reconcile_record(record, &self.registry, log);
        if !unresolved.is_empty() {
            tracing::debug!(trace_id = %ctx.trace_id, ?unresolved, "names left for the validator");
        }
        Ok(())
    }
}
