//! HTTP surface tests: drive the router in-process against a temp store
//! with scripted model stand-ins.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use http_body_util::BodyExt;
use jansahayak_api::audit::AuditPipeline;
use jansahayak_api::db::ComplaintStore;
use jansahayak_api::llm::{ImagePayload, ModelError, TextModel, VisionModel};
use jansahayak_api::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

struct FixedVision(Option<&'static str>);

#[async_trait]
impl VisionModel for FixedVision {
    fn name(&self) -> &str {
        "fixed-vision"
    }
    async fn analyze_image(&self, _: &str, _: &ImagePayload) -> Result<String, ModelError> {
        self.0.map(str::to_string).ok_or(ModelError::EmptyResponse)
    }
}

struct FixedPlanner;

#[async_trait]
impl TextModel for FixedPlanner {
    fn name(&self) -> &str {
        "fixed-planner"
    }
    async fn generate(&self, _: &str) -> Result<String, ModelError> {
        Ok("Immediate Actions: barricade. Budget: ₹40,000.".into())
    }
}

const TRAFFIC_POTHOLE: &str = r#"{"damage_type":"pothole","severity":6,
    "metadata":{"near_school":false,"heavy_traffic":true,"water_leak":false,"monsoon_critical":false},
    "description":"Pothole on a busy junction"}"#;

fn state(store: ComplaintStore, vision_reply: Option<&'static str>) -> AppState {
    AppState::new(AuditPipeline::new(Arc::new(FixedVision(vision_reply)), Arc::new(FixedPlanner), store))
}

fn app(dir: &tempfile::TempDir, vision_reply: Option<&'static str>) -> Router {
    build_router(state(ComplaintStore::open(dir.path().join("civic_memory.json")), vision_reply))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()));
    (status, value)
}

fn complaint_body(location: &str) -> Value {
    json!({
        "citizen_name": "Asha",
        "citizen_phone": "9800000000",
        "location": location,
        "issue_type": "pothole",
        "image_base64": "/9j/4AAQSkZJRg=="
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, Some(TRAFFIC_POTHOLE));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "jansahayak-api");
    assert_eq!(body["store_present"], false);
    assert!(body["store_path"].as_str().unwrap().ends_with("civic_memory.json"));

    send(&app, "POST", "/api/v1/complaints", Some(complaint_body("MG Road"))).await;
    let (_, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(body["store_present"], true);
}

#[tokio::test]
async fn catalog_lists_issue_types_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(&app(&dir, None), "GET", "/api/v1/issue-types", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue_types"][0], "Pothole");
    assert_eq!(body["issue_types"][7], "Other");
    assert_eq!(body["statuses"][2]["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn submit_registers_complaint_with_trace() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, Some(TRAFFIC_POTHOLE));

    let (status, body) = send(&app, "POST", "/api/v1/complaints", Some(complaint_body("MG Road"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let c = &body["complaint"];
    assert_eq!(c["issue_type"], "Pothole");
    assert_eq!(c["risk_data"]["risk_index"], 75);
    assert_eq!(c["risk_data"]["urgency"], "HIGH");
    assert_eq!(c["status"], "SUBMITTED");
    assert_eq!(c["status_history"].as_array().unwrap().len(), 1);
    assert!(!body["trace"].as_array().unwrap().is_empty());

    let id = c["complaint_id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/v1/complaints/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&fetched, c);
    // the trace is returned to the caller only
    assert!(fetched.get("trace").is_none());
}

#[tokio::test]
async fn submit_with_unreachable_vision_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, None);
    let (status, body) = send(&app, "POST", "/api/v1/complaints", Some(complaint_body("MG Road"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["complaint"]["vision_data"]["severity"], 5);
    assert_eq!(body["complaint"]["risk_data"]["risk_index"], 50);
}

#[tokio::test]
async fn submit_rejects_missing_fields_before_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, Some(TRAFFIC_POTHOLE));

    let mut body = complaint_body("MG Road");
    body["citizen_name"] = json!("");
    let (status, _) = send(&app, "POST", "/api/v1/complaints", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = complaint_body("MG Road");
    body["issue_type"] = json!("Sinkhole");
    let (status, _) = send(&app, "POST", "/api/v1/complaints", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&app, "GET", "/api/v1/complaints", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn status_update_appends_history() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, Some(TRAFFIC_POTHOLE));
    let (_, body) = send(&app, "POST", "/api/v1/complaints", Some(complaint_body("MG Road"))).await;
    let id = body["complaint"]["complaint_id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/complaints/{id}/status");
    let (status, rec) = send(&app, "PATCH", &uri, Some(json!({"status": "resolved", "notes": "fixed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rec["status"], "RESOLVED");
    assert_eq!(rec["authority_notes"], "fixed");
    assert_eq!(rec["status_history"].as_array().unwrap().len(), 2);
    assert_eq!(rec["status_history"][1]["status"], "RESOLVED");

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({"status": "CLOSED"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_complaint_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, None);
    let (status, _) = send(&app, "GET", "/api/v1/complaints/JAN000000000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/v1/complaints/JAN000000000000/status",
        Some(json!({"status": "ACKNOWLEDGED"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!dir.path().join("civic_memory.json").exists());
}

#[tokio::test]
async fn list_filters_and_stats_project_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, Some(TRAFFIC_POTHOLE));
    send(&app, "POST", "/api/v1/complaints", Some(complaint_body("MG Road"))).await;
    let (_, second) = send(&app, "POST", "/api/v1/complaints", Some(complaint_body("Park Street"))).await;
    assert_eq!(
        second["complaint"]["context"],
        "No prior incidents reported at this location."
    );

    let (_, all) = send(&app, "GET", "/api/v1/complaints", None).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    // newest first
    assert_eq!(all[0]["location"], "Park Street");

    let (_, submitted) = send(&app, "GET", "/api/v1/complaints?status=SUBMITTED&limit=1", None).await;
    assert_eq!(submitted.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/api/v1/complaints?status=lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = send(&app, "GET", "/api/v1/stats", None).await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["open"], 2);
    assert_eq!(stats["by_urgency"]["HIGH"], 2);
    assert_eq!(stats["by_location"]["MG Road"], 1);
    assert_eq!(stats["mean_risk_index"], 75.0);
}

#[tokio::test]
async fn multi_megabyte_photo_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, Some(TRAFFIC_POTHOLE));

    // 3 MiB of image data is 4 MiB once base64-encoded
    let mut body = complaint_body("MG Road");
    body["image_base64"] = json!(general_purpose::STANDARD.encode(vec![0xFFu8; 3 << 20]));
    let (status, resp) = send(&app, "POST", "/api/v1/complaints", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{resp}");
    assert_eq!(resp["complaint"]["risk_data"]["risk_index"], 75);
}

#[tokio::test]
async fn body_over_configured_limit_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let store = ComplaintStore::open(dir.path().join("civic_memory.json"));
    let app = build_router(state(store, Some(TRAFFIC_POTHOLE)).with_max_body_bytes(1 << 20));

    let mut body = complaint_body("MG Road");
    body["image_base64"] = json!(general_purpose::STANDARD.encode(vec![0xFFu8; 1 << 20]));
    let (status, _) = send(&app, "POST", "/api/v1/complaints", Some(body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!dir.path().join("civic_memory.json").exists());
}

#[tokio::test]
async fn store_failure_returns_500_with_trace() {
    let dir = tempfile::tempdir().unwrap();
    // the store path is a directory, so every read fails
    let app = build_router(state(ComplaintStore::open(dir.path()), Some(TRAFFIC_POTHOLE)));

    let (status, body) = send(&app, "POST", "/api/v1/complaints", Some(complaint_body("MG Road"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["complaint"].is_null());
    assert!(body["error"].as_str().unwrap().starts_with("internal error"));
    let trace = body["trace"].as_array().unwrap();
    assert!(trace.iter().any(|t| t["agent"] == "Agent-V"));
    assert_eq!(trace.last().unwrap()["agent"], "Store");
}
