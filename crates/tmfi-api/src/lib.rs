//! TMFI API /v1: REST endpoints over the intent pipeline
pub mod handlers;
pub mod metrics;
pub mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tmfi_core::IcmEncoder;
use tmfi_stages::IntentPipeline;
use tower_http::trace::TraceLayer;

pub use metrics::ApiMetrics;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IntentPipeline>,
    pub metrics: Arc<ApiMetrics>,
    /// Shared so ICM identifiers stay unique across requests
    pub icm: Arc<IcmEncoder>,
}

impl AppState {
    pub fn new(pipeline: IntentPipeline) -> Result<Self, prometheus::Error> {
        Ok(Self {
            pipeline: Arc::new(pipeline),
            metrics: Arc::new(ApiMetrics::new()?),
            icm: Arc::new(IcmEncoder::new()),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Lazy::force(&handlers::STARTED_AT);

    Router::new()
        .route("/v1/validate", post(handlers::validate))
        .route("/v1/validate/batch", post(handlers::validate_batch))
        .route("/v1/icm/export", post(handlers::export_icm))
        .route("/v1/icm/import", post(handlers::import_icm))
        .route("/v1/catalog", get(handlers::catalog))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("TMFI API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
