//! Remediation plan drafting ("Agent-P").

use super::Trace;
use crate::llm::TextModel;
use crate::models::{RiskData, Urgency, VisionData};

pub const AGENT: &str = "Agent-P";

// Fallback budget band, per severity point.
const BUDGET_LOW_PER_POINT: i64 = 10_000;
const BUDGET_HIGH_PER_POINT: i64 = 25_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Generated(String),
    Recovered { plan: String, reason: String },
}

impl PlanOutcome {
    pub fn into_text(self) -> String {
        match self {
            PlanOutcome::Generated(p) | PlanOutcome::Recovered { plan: p, .. } => p,
        }
    }
}

pub fn prompt(vision: &VisionData, risk: &RiskData, context: &str, location: &str) -> String {
    format!(
        "You are a senior municipal engineer. Draft a remediation plan for {damage} at {location}.\n\
         Severity: {severity}/10. Risk index: {risk_index}/100. Urgency: {urgency}.\n\
         Site history: {context}\n\
         Keep it under 200 words, using these headings: Immediate Actions, Resources, \
         Timeline, Budget Estimate (in INR).",
        damage = vision.damage_type,
        severity = vision.severity,
        risk_index = risk.risk_index,
        urgency = risk.urgency,
    )
}

/// Templated plan used when the text model is unavailable. Budget scales
/// linearly with severity.
pub fn fallback(vision: &VisionData, risk: &RiskData, location: &str) -> String {
    let severity = vision.severity.max(1);
    let timeline = match risk.urgency {
        Urgency::Critical => "within 24 hours",
        Urgency::High => "within 72 hours",
        Urgency::Moderate => "within 7 days",
    };
    format!(
        "**Immediate Actions**\n\
         - Dispatch a field engineer to inspect the {damage} at {location}.\n\
         - Barricade and mark the site if it poses a public hazard.\n\n\
         **Resources**\n\
         - One inspection crew; repair crew to be assigned after inspection.\n\n\
         **Timeline**\n\
         - Inspection {timeline} (urgency {urgency}).\n\n\
         **Budget Estimate**\n\
         - {low} to {high} (provisional, severity {severity}/10).\n\n\
         Manual assessment required by municipal engineer.",
        damage = vision.damage_type,
        urgency = risk.urgency,
        low = inr(severity.saturating_mul(BUDGET_LOW_PER_POINT)),
        high = inr(severity.saturating_mul(BUDGET_HIGH_PER_POINT)),
    )
}

fn inr(amount: i64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("₹{out}")
}

pub async fn generate(
    model: &dyn TextModel,
    vision: &VisionData,
    risk: &RiskData,
    context: &str,
    location: &str,
    trace: &mut Trace,
) -> PlanOutcome {
    trace.log(AGENT, format!("Drafting remediation plan with {}...", model.name()));
    match model.generate(&prompt(vision, risk, context, location)).await {
        Ok(plan) => {
            trace.log(AGENT, "Action plan generated.");
            PlanOutcome::Generated(plan)
        }
        Err(e) => {
            tracing::warn!(error = %e, "plan generation failed, using template");
            trace.log(AGENT, format!("⚠️ Planner error: {e}. Using templated plan."));
            PlanOutcome::Recovered {
                plan: fallback(vision, risk, location),
                reason: e.to_string(),
            }
        }
    }
}
