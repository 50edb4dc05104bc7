//! Service entry point: environment, logging, model clients, HTTP server.

use std::sync::Arc;

use jansahayak_api::{
    audit::AuditPipeline, build_router, config::Config, db::ComplaintStore, llm::GeminiClient,
    AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env();
    if cfg.api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set; every complaint will use fallback assessments");
    }

    let vision = GeminiClient::new(&cfg.gemini_base, &cfg.vision_model, cfg.api_key.clone(), cfg.model_timeout)?;
    let planner = GeminiClient::new(&cfg.gemini_base, &cfg.plan_model, cfg.api_key.clone(), cfg.model_timeout)?;
    let store = ComplaintStore::open(&cfg.store_path);
    tracing::info!(path = %store.path().display(), "using complaint store");

    let state = AppState::new(AuditPipeline::new(Arc::new(vision), Arc::new(planner), store))
        .with_max_body_bytes(cfg.max_body_bytes);

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API listening");

    axum::serve(listener, build_router(state).into_make_service()).await?;
    Ok(())
}
