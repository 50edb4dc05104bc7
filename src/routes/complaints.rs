//! Complaint intake, lookup and authority status updates.

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::audit::{update_status, PipelineError, SubmitOutcome, Submission};
use crate::llm::ImagePayload;
use crate::models::{ComplaintRecord, ComplaintStatus, TraceEntry};
use crate::AppState;
use super::{bad_request, internal_error, not_found};

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitBody {
    pub citizen_name: String,
    pub citizen_phone: String,
    pub location: String,
    pub issue_type: String,
    /// Raw base64 or a `data:<mime>;base64,` URL.
    pub image_base64: String,
    #[serde(default = "default_mime")] pub image_mime_type: String,
}
fn default_mime() -> String { "image/jpeg".into() }

#[derive(Serialize)]
pub struct SubmitResp {
    pub complaint: Option<ComplaintRecord>,
    pub trace: Vec<TraceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQ {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
    #[serde(default)] pub notes: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn decode_image(raw: &str, declared_mime: &str) -> Result<ImagePayload, String> {
    let (mime, data) = match raw.strip_prefix("data:").and_then(|r| r.split_once(";base64,")) {
        Some((mime, data)) => (mime.to_string(), data),
        None => (declared_mime.to_string(), raw),
    };
    let bytes = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| format!("image_base64 is not valid base64: {e}"))?;
    Ok(ImagePayload { mime_type: mime, bytes })
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/complaints
pub async fn submit_complaint(
    State(state): State<AppState>,
    Json(b): Json<SubmitBody>,
) -> Result<(StatusCode, Json<SubmitResp>), (StatusCode, String)> {
    let image = decode_image(&b.image_base64, &b.image_mime_type).map_err(bad_request)?;
    let submission = Submission {
        image,
        location: b.location,
        issue_type: b.issue_type,
        citizen_name: b.citizen_name,
        citizen_phone: b.citizen_phone,
    };

    match state.pipeline.submit(submission).await {
        Ok(SubmitOutcome::Registered { record, trace }) => Ok((
            StatusCode::CREATED,
            Json(SubmitResp { complaint: Some(record), trace, error: None }),
        )),
        Ok(SubmitOutcome::Aborted { trace }) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(SubmitResp { complaint: None, trace, error: None }),
        )),
        Err(PipelineError::Validation(e)) => Err(bad_request(e)),
        // the citizen still sees how far the audit got
        Err(PipelineError::Store { source, trace }) => {
            let (status, message) = internal_error(source);
            Ok((status, Json(SubmitResp { complaint: None, trace, error: Some(message) })))
        }
    }
}

/// GET /api/v1/complaints
pub async fn list_complaints(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<ComplaintRecord>>, (StatusCode, String)> {
    let status = match q.status.as_deref() {
        Some(s) => Some(
            ComplaintStatus::parse(s).ok_or_else(|| bad_request(format!("unknown status '{s}'")))?,
        ),
        None => None,
    };
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0);

    let records = state.pipeline.store().load().await.map_err(internal_error)?;
    let rows = records
        .into_iter()
        .rev()
        .filter(|r| status.map_or(true, |st| r.status == st))
        .skip(offset)
        .take(limit)
        .collect();
    Ok(Json(rows))
}

/// GET /api/v1/complaints/:id
pub async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ComplaintRecord>, (StatusCode, String)> {
    let row = state.pipeline.store().find(&id).await.map_err(internal_error)?;
    row.map(Json).ok_or_else(|| not_found(&format!("complaint {id}")))
}

/// PATCH /api/v1/complaints/:id/status
pub async fn update_complaint_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<StatusBody>,
) -> Result<Json<ComplaintRecord>, (StatusCode, String)> {
    let status = ComplaintStatus::parse(&b.status)
        .ok_or_else(|| bad_request(format!("unknown status '{}'", b.status)))?;
    let row = update_status(state.pipeline.store(), &id, status, &b.notes)
        .await
        .map_err(internal_error)?;
    row.map(Json).ok_or_else(|| not_found(&format!("complaint {id}")))
}
