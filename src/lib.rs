//! JanSahayak civic complaint audit service: router and shared state.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod audit;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod routes;

use audit::AuditPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: AuditPipeline,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: AuditPipeline) -> Self {
        Self { pipeline, max_body_bytes: config::DEFAULT_MAX_BODY_MB * 1024 * 1024 }
    }

    pub fn with_max_body_bytes(mut self, n: usize) -> Self {
        self.max_body_bytes = n;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    // Very permissive CORS for the citizen/authority frontends
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        // health
        .route("/health", get(routes::health::health))
        // catalog
        .route("/api/v1/issue-types", get(routes::catalog::list_issue_types))
        // complaints
        .route(
            "/api/v1/complaints",
            post(routes::complaints::submit_complaint).get(routes::complaints::list_complaints),
        )
        .route("/api/v1/complaints/:id", get(routes::complaints::get_complaint))
        .route(
            "/api/v1/complaints/:id/status",
            patch(routes::complaints::update_complaint_status),
        )
        // analytics
        .route("/api/v1/stats", get(routes::stats::get_stats))
        // state & middleware
        .with_state(state)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
