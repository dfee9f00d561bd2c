//! Stage Trait: single contract for every record-rewriting step
use crate::context::RunContext;
use crate::data_model::{CorrectionLog, Record};

/// A deterministic rewrite applied to a record in place.
///
/// Stages never fail for data-quality reasons; they append to the log and
/// leave what they cannot repair untouched.
pub trait Stage: Send + Sync {
    /// Unique stage id (ex: "reconcile.names.v1")
    fn id(&self) -> &'static str;

    /// Whether the stage is deterministic (default: true)
    fn deterministic(&self) -> bool {
        true
    }

    /// Run the stage
    fn run(&self, record: &mut Record, log: &mut CorrectionLog, ctx: &RunContext) -> Result<(), StageError>;
}

#[derive(Debug, Clone)]
pub enum StageError {
    ExecutionFailed(String),
    Determinism(String),
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ExecutionFailed(msg) => write!(f, "STAGE/EXEC: {}", msg),
            Self::Determinism(msg) => write!(f, "DET/HASH: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}
