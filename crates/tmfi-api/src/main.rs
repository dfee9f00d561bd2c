//! Binary entrypoint for the TMFI API server.
use anyhow::Context;
use tmfi_api::{run, AppState};
use tmfi_stages::{IntentPipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Defaults can be overridden with TMFI_ADDR and TMFI_CONFIG
    let addr = std::env::var("TMFI_ADDR").unwrap_or_else(|_| "0.0.0.0:8788".to_string());
    let config_path = std::env::var("TMFI_CONFIG").unwrap_or_else(|_| "config/pipeline.yaml".to_string());

    let config = PipelineConfig::load(&config_path)?;
    let pipeline = IntentPipeline::from_config(&config).context("cannot load catalog")?;
    let state = AppState::new(pipeline)?;

    run(&addr, state).await
}
