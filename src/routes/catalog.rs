//! Static catalogs the frontends render: issue types and status labels.

use axum::Json;
use serde::Serialize;

use crate::models::{ComplaintStatus, IssueType};

#[derive(Serialize)]
pub struct StatusLabel { pub status: ComplaintStatus, pub label: &'static str }

#[derive(Serialize)]
pub struct Catalog {
    pub issue_types: Vec<&'static str>,
    pub statuses: Vec<StatusLabel>,
}

/// GET /api/v1/issue-types
pub async fn list_issue_types() -> Json<Catalog> {
    Json(Catalog {
        issue_types: IssueType::ALL.iter().map(|t| t.label()).collect(),
        statuses: ComplaintStatus::ALL
            .iter()
            .map(|&status| StatusLabel { status, label: status.label() })
            .collect(),
    })
}
