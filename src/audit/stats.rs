//! Read-side aggregates over the whole store.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{ComplaintRecord, ComplaintStatus, Urgency};

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct StoreStats {
    pub total: usize,
    pub open: usize,
    pub mean_risk_index: f64,
    pub by_status: BTreeMap<ComplaintStatus, usize>,
    pub by_urgency: BTreeMap<Urgency, usize>,
    pub by_issue_type: BTreeMap<String, usize>,
    pub by_location: BTreeMap<String, usize>,
    pub by_day: BTreeMap<String, usize>,
}

impl StoreStats {
    pub fn from_records(records: &[ComplaintRecord]) -> Self {
        let mut s = StoreStats { total: records.len(), ..Default::default() };
        let mut risk_sum = 0u64;

        for r in records {
            if r.status.is_open() {
                s.open += 1;
            }
            risk_sum += u64::from(r.risk_data.risk_index);
            *s.by_status.entry(r.status).or_default() += 1;
            *s.by_urgency.entry(r.risk_data.urgency).or_default() += 1;
            *s.by_issue_type.entry(r.issue_type.clone()).or_default() += 1;
            *s.by_location.entry(r.location.clone()).or_default() += 1;
            *s.by_day.entry(r.timestamp.format("%Y-%m-%d").to_string()).or_default() += 1;
        }

        if s.total > 0 {
            s.mean_risk_index = risk_sum as f64 / s.total as f64;
        }
        s
    }
}
