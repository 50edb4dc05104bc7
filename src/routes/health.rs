//! Liveness check. Also says whether the complaint store file exists yet,
//! which is the first thing to look at when a fresh deployment shows no data.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResp {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub store_path: String,
    pub store_present: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let path = state.pipeline.store().path();
    let store_present = tokio::fs::try_exists(path).await.unwrap_or(false);
    Json(HealthResp {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        store_path: path.display().to_string(),
        store_present,
    })
}
