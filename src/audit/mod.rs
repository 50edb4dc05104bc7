//! Complaint audit core: vision extraction, risk scoring, location context,
//! plan generation, the orchestrating pipeline and the status lifecycle.

pub mod context;
pub mod pipeline;
pub mod planner;
pub mod risk;
pub mod stats;
pub mod status;
pub mod vision;

pub use pipeline::{AuditPipeline, PipelineError, SubmitOutcome, Submission};
pub use risk::score;
pub use stats::StoreStats;
pub use status::update_status;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::models::TraceEntry;

/// Current local time truncated to whole seconds, the resolution records
/// are stored at.
pub fn now() -> NaiveDateTime {
    let t = Local::now().naive_local();
    t.with_nanosecond(0).unwrap_or(t)
}

/// Per-submission stage log returned to the caller and never persisted.
#[derive(Debug, Default, Clone)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, agent: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(agent, "{message}");
        self.entries.push(TraceEntry {
            agent: agent.to_string(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message,
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries
    }
}
