//! Same-location history ("Agent-C").

use crate::models::{ComplaintRecord, ComplaintStatus};

pub const AGENT: &str = "Agent-C";

pub const NO_PRIOR_INCIDENTS: &str = "No prior incidents reported at this location.";

/// Summarises earlier complaints at `location`. Matching is exact after
/// lowercasing both sides; no trimming or fuzzy matching.
pub fn summarize(records: &[ComplaintRecord], location: &str) -> String {
    let wanted = location.to_lowercase();
    let matches: Vec<&ComplaintRecord> = records
        .iter()
        .filter(|r| r.location.to_lowercase() == wanted)
        .collect();

    let Some(latest) = matches.last() else {
        return NO_PRIOR_INCIDENTS.to_string();
    };

    let unresolved = matches
        .iter()
        .filter(|r| r.status != ComplaintStatus::Resolved)
        .count();

    if unresolved > 0 {
        format!(
            "Recurring issue: {unresolved} unresolved complaint(s) already on record at this location. \
             Most recent reported severity: {}/10.",
            latest.vision_data.severity
        )
    } else {
        format!(
            "{} previous complaint(s) at this location, all resolved.",
            matches.len()
        )
    }
}
