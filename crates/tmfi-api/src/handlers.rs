//! API Handlers
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use thiserror::Error;
use tmfi_core::icm;
use tmfi_in::ExtractionFailure;
use tmfi_stages::{BatchItem, BatchReport, PipelineError, PipelineOutcome};

pub(crate) static STARTED_AT: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Raw generator output
    pub text: String,
    /// Request the output was generated from; enables the semantic check
    #[serde(default)]
    pub scenario: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to extract")]
    Extract(ExtractionFailure),

    #[error("invalid ICM intent: {0}")]
    BadIntent(String),

    #[error("{0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Extract(failure) => ApiError::Extract(failure),
            PipelineError::Run(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Extract(failure) => {
                let attempts: Vec<Value> = failure
                    .attempts
                    .iter()
                    .map(|(strategy, err)| json!({ "strategy": strategy, "error": err.to_string() }))
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": self.to_string(), "attempts": attempts }),
                )
            }
            ApiError::BadIntent(_) => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };
        (status, Json(body)).into_response()
    }
}

pub async fn validate(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<PipelineOutcome>, ApiError> {
    run_pipeline(&state, &payload).map(Json)
}

fn run_pipeline(state: &AppState, payload: &ValidateRequest) -> Result<PipelineOutcome, ApiError> {
    let start = Instant::now();
    let result = state
        .pipeline
        .process_with_scenario(&payload.text, payload.scenario.as_deref());
    state.metrics.observe_duration(start.elapsed().as_secs_f64());

    match result {
        Ok(outcome) => {
            state.metrics.observe_outcome(&outcome);
            Ok(outcome)
        }
        Err(e) => {
            state.metrics.observe_failure(match &e {
                PipelineError::Extract(_) => "extraction_failed",
                PipelineError::Run(_) => "error",
            });
            Err(e.into())
        }
    }
}

/// Batches run off the async workers
pub async fn validate_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchRequest>,
) -> Result<Json<BatchReport>, ApiError> {
    let pipeline = state.pipeline.clone();
    let start = Instant::now();
    let report = tokio::task::spawn_blocking(move || pipeline.process_batch(&payload.items))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    state.metrics.observe_duration(start.elapsed().as_secs_f64());

    for entry in &report.entries {
        match entry.outcome() {
            Some(outcome) => state.metrics.observe_outcome(outcome),
            None => state.metrics.observe_failure("failed"),
        }
    }

    Ok(Json(report))
}

/// Repair generator output, then export the record as an ICM intent
pub async fn export_icm(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = run_pipeline(&state, &payload)?;
    Ok(Json(json!({
        "trace_id": outcome.trace_id,
        "overall_valid": outcome.verdict().overall_valid(),
        "intent": state.icm.encode(&outcome.record),
    })))
}

/// Read an ICM intent back into a record and run it through the pipeline
pub async fn import_icm(
    State(state): State<AppState>,
    Json(intent): Json<Value>,
) -> Result<Json<PipelineOutcome>, ApiError> {
    let record = icm::decode(&intent).map_err(|e| ApiError::BadIntent(e.to_string()))?;
    let start = Instant::now();
    let result = state.pipeline.process_record(record);
    state.metrics.observe_duration(start.elapsed().as_secs_f64());

    match result {
        Ok(outcome) => {
            state.metrics.observe_outcome(&outcome);
            Ok(Json(outcome))
        }
        Err(e) => {
            state.metrics.observe_failure("error");
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

pub async fn catalog(State(state): State<AppState>) -> Json<Value> {
    let registry = state.pipeline.registry();
    let key: Vec<&str> = registry.key_characteristics().iter().map(|s| s.name.as_str()).collect();
    Json(json!({
        "count": registry.len(),
        "characteristics": registry.all(),
        "key_characteristics": key,
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let started_at = *STARTED_AT;
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": tmfi_core::TMFI_VERSION,
            "pipeline": state.pipeline.pipeline_id(),
            "catalog_size": state.pipeline.registry().len(),
            "started_at": started_at,
            "uptime_seconds": (Utc::now() - started_at).num_seconds(),
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.metrics.encode().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}
