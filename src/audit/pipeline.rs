//! Submission orchestration: vision → risk → context → plan → store.
//!
//! Stages run strictly in sequence, each feeding the next. Model failures
//! degrade to fallbacks inside their stage; the only early exit after
//! validation is a vision reply that refuses the image.

use std::sync::Arc;

use chrono::NaiveDateTime;
use thiserror::Error;

use super::{context, now, planner, risk, vision, Trace};
use crate::db::{ComplaintStore, StoreError};
use crate::llm::{ImagePayload, TextModel, VisionModel};
use crate::models::{ComplaintRecord, ComplaintStatus, IssueType, StatusEntry, TraceEntry};

const RISK_AGENT: &str = "Agent-R";
const STORE_AGENT: &str = "Store";
const ID_PREFIX: &str = "JAN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("unknown issue type '{0}'")]
    UnknownIssueType(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    /// The store could not be read or written. `trace` holds every stage
    /// that ran before the failure.
    #[error("{source}")]
    Store {
        #[source]
        source: StoreError,
        trace: Vec<TraceEntry>,
    },
}

impl PipelineError {
    /// Stage log gathered before the failure; empty for validation errors.
    pub fn trace(&self) -> &[TraceEntry] {
        match self {
            PipelineError::Validation(_) => &[],
            PipelineError::Store { trace, .. } => trace,
        }
    }
}

/// Citizen-supplied fields plus the uploaded photo.
#[derive(Debug, Clone)]
pub struct Submission {
    pub image: ImagePayload,
    pub location: String,
    pub issue_type: String,
    pub citizen_name: String,
    pub citizen_phone: String,
}

impl Submission {
    /// Checks every required field before any stage runs.
    pub fn validate(&self) -> Result<IssueType, ValidationError> {
        let required = [
            ("citizen_name", &self.citizen_name),
            ("citizen_phone", &self.citizen_phone),
            ("location", &self.location),
            ("issue_type", &self.issue_type),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::Missing(field));
            }
        }
        if self.image.bytes.is_empty() {
            return Err(ValidationError::Missing("image"));
        }
        IssueType::parse(&self.issue_type)
            .ok_or_else(|| ValidationError::UnknownIssueType(self.issue_type.clone()))
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Registered { record: ComplaintRecord, trace: Vec<TraceEntry> },
    Aborted { trace: Vec<TraceEntry> },
}

/// `JAN` followed by `yymmddHHMMSS` of the creation instant. Two submissions
/// in the same second get the same id; nothing checks for that.
pub fn complaint_id_at(at: NaiveDateTime) -> String {
    format!("{ID_PREFIX}{}", at.format("%y%m%d%H%M%S"))
}

fn store_failure(source: StoreError, step: &str, mut trace: Trace) -> PipelineError {
    tracing::error!(error = %source, step, "complaint store failed mid-pipeline");
    trace.log(STORE_AGENT, format!("❌ Could not {step}: {source}"));
    PipelineError::Store { source, trace: trace.into_entries() }
}

#[derive(Clone)]
pub struct AuditPipeline {
    vision: Arc<dyn VisionModel>,
    planner: Arc<dyn TextModel>,
    store: ComplaintStore,
}

impl AuditPipeline {
    pub fn new(vision: Arc<dyn VisionModel>, planner: Arc<dyn TextModel>, store: ComplaintStore) -> Self {
        Self { vision, planner, store }
    }

    pub fn store(&self) -> &ComplaintStore {
        &self.store
    }

    pub async fn submit(&self, sub: Submission) -> Result<SubmitOutcome, PipelineError> {
        let issue = sub.validate()?;
        let mut trace = Trace::new();

        // 1) vision
        let extraction = vision::extract(self.vision.as_ref(), &sub.image, issue, &mut trace).await;
        let Some(vision_data) = extraction.into_vision_data() else {
            return Ok(SubmitOutcome::Aborted { trace: trace.into_entries() });
        };

        // 2) risk
        let risk_data = risk::score(vision_data.severity, &vision_data.metadata);
        trace.log(
            RISK_AGENT,
            format!("Risk index {}/100 ({})", risk_data.risk_index, risk_data.urgency),
        );

        // 3) context snapshot
        let history = match self.store.load().await {
            Ok(h) => h,
            Err(e) => return Err(store_failure(e, "read complaint history", trace)),
        };
        let context = context::summarize(&history, &sub.location);
        trace.log(context::AGENT, context.clone());

        // 4) plan
        let action_plan = planner::generate(
            self.planner.as_ref(),
            &vision_data,
            &risk_data,
            &context,
            &sub.location,
            &mut trace,
        )
        .await
        .into_text();

        // 5) assemble
        let created = now();
        let record = ComplaintRecord {
            complaint_id: complaint_id_at(created),
            timestamp: created,
            location: sub.location,
            issue_type: issue.label().to_string(),
            citizen_name: sub.citizen_name,
            citizen_phone: sub.citizen_phone,
            vision_data,
            risk_data,
            action_plan,
            context,
            status: ComplaintStatus::Submitted,
            status_history: vec![StatusEntry { status: ComplaintStatus::Submitted, timestamp: created }],
            authority_notes: String::new(),
        };

        // 6) persist
        if let Err(e) = self.store.append(record.clone()).await {
            return Err(store_failure(e, "persist complaint", trace));
        }
        tracing::info!(
            complaint_id = %record.complaint_id,
            risk_index = record.risk_data.risk_index,
            urgency = %record.risk_data.urgency,
            "complaint registered"
        );

        Ok(SubmitOutcome::Registered { record, trace: trace.into_entries() })
    }
}
