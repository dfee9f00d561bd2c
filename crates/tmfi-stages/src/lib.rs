//! TMFI Stages: the repair stages and the end-to-end pipeline built on them.
//!
//! # Pipeline Flow
//!
//! ```text
//! Text → Extract → Reconcile → Correct → Validate → Outcome
//!           ↓          ↓           ↓          ↓
//!        Record     Names      Values     Verdict
//! ```
//!
//! Reconcile and correct run as [`tmfi_core::Stage`]s through a
//! [`tmfi_core::PipelineRunner`], so every outcome carries a proof per stage.

pub mod config;
mod correct;
pub mod pipeline;
mod reconcile;

pub use config::{ConfigError, PipelineConfig};
pub use correct::CorrectStage;
pub use pipeline::{
    default_stages, BatchEntry, BatchItem, BatchReport, IntentPipeline, PipelineError, PipelineOutcome,
};
pub use reconcile::ReconcileStage;
