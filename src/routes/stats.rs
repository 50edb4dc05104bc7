//! Aggregate dashboard figures over the whole store.

use axum::{extract::State, Json};

use crate::{audit::StoreStats, AppState};
use super::internal_error;

/// GET /api/v1/stats
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StoreStats>, (axum::http::StatusCode, String)> {
    let records = state.pipeline.store().load().await.map_err(internal_error)?;
    Ok(Json(StoreStats::from_records(&records)))
}
