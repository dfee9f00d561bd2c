//! TMFI Core: data model, stage contract and runner
//!
//! Shared by every crate of the intent repair pipeline. Everything here is
//! synchronous and free of I/O; records can be processed on any thread.

pub mod context;
pub mod data_model;
pub mod error;
pub mod icm;
pub mod runner;
pub mod stage;
pub mod units;

pub use context::RunContext;
pub use data_model::{
    Correction, CorrectionKind, CorrectionLog, CorrectionSummary, Field, FieldValue, IngestError, RawValue,
    Record, StageProof, ValueTag, Verdict, FIELD_LIST_KEY, UNIT_KEY,
};
pub use error::TmfiError;
pub use icm::{IcmEncoder, IcmOperator, ICM_CONTEXT};
pub use runner::{content_hash, PipelineRunner};
pub use stage::{Stage, StageError};
pub use units::UnitSynonyms;

/// Pipeline engine version
pub const TMFI_VERSION: &str = "1.0.0";
