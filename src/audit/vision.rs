//! Vision extraction stage ("Agent-V").
//!
//! One call to the vision model, a lenient parse of its JSON reply, and a
//! fixed fallback payload whenever the call or the parse fails.

use serde_json::Value;

use super::Trace;
use crate::llm::{ImagePayload, ModelError, VisionModel};
use crate::models::{severity_from_value, HazardFlags, IssueType, VisionData};

pub const AGENT: &str = "Agent-V";

const FALLBACK_SEVERITY: i64 = 5;
const FALLBACK_DESCRIPTION: &str =
    "Automated analysis unavailable. Manual review required by a field engineer.";

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The model's reply parsed into a full assessment.
    Extracted(VisionData),
    /// The model could not be used; the fallback payload stands in.
    Recovered { data: VisionData, reason: String },
    /// The model answered but refused the image. Nothing to build on.
    Unusable(String),
}

impl Extraction {
    pub fn into_vision_data(self) -> Option<VisionData> {
        match self {
            Extraction::Extracted(d) | Extraction::Recovered { data: d, .. } => Some(d),
            Extraction::Unusable(_) => None,
        }
    }
}

pub fn prompt(issue: IssueType) -> String {
    format!(
        r#"Analyze this {issue} image as a municipal infrastructure inspector.
Return ONLY a valid JSON object, no prose, with exactly this shape:
{{
    "damage_type": "{issue}",
    "severity": <integer 1-10>,
    "metadata": {{"near_school": <bool>, "heavy_traffic": <bool>, "water_leak": <bool>, "monsoon_critical": <bool>}},
    "description": "<short assessment>"
}}"#
    )
}

/// Payload used whenever the model cannot be relied on.
pub fn fallback(issue: IssueType) -> VisionData {
    VisionData {
        damage_type: issue.label().to_lowercase(),
        severity: FALLBACK_SEVERITY,
        metadata: HazardFlags::default(),
        description: FALLBACK_DESCRIPTION.to_string(),
    }
}

/// Drops markdown fences and any chatter around the outermost JSON object.
pub fn strip_code_fences(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix("```json").or_else(|| t.strip_prefix("```")).unwrap_or(t);
    let t = t.trim_end().strip_suffix("```").unwrap_or(t).trim();
    match (t.find('{'), t.rfind('}')) {
        (Some(start), Some(end)) if start < end => &t[start..=end],
        _ => t,
    }
}

/// Parses a model reply. On success also returns an adjustment note when
/// the severity had to be clamped into 1..=10.
pub fn parse_response(text: &str, issue: IssueType) -> Result<(VisionData, Option<String>), String> {
    let v: Value = serde_json::from_str(strip_code_fences(text)).map_err(|e| format!("invalid JSON: {e}"))?;
    let obj = v.as_object().ok_or("reply is not a JSON object")?;

    let raw_severity = obj
        .get("severity")
        .and_then(severity_from_value)
        .ok_or("missing or non-numeric severity")?;
    let severity = raw_severity.clamp(1, 10);
    let note = (severity != raw_severity)
        .then(|| format!("severity {raw_severity} out of range, clamped to {severity}"));

    let damage_type = obj
        .get("damage_type")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| issue.label().to_lowercase());

    let data = VisionData {
        damage_type,
        severity,
        metadata: obj.get("metadata").map(HazardFlags::from_value).unwrap_or_default(),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    };
    Ok((data, note))
}

/// Runs the stage. Never returns an error; every failure is folded into
/// the `Extraction` tag and logged to `trace`.
pub async fn extract(
    model: &dyn VisionModel,
    image: &ImagePayload,
    issue: IssueType,
    trace: &mut Trace,
) -> Extraction {
    trace.log(AGENT, format!("Initializing {} for {issue} analysis...", model.name()));

    let reply = match model.analyze_image(&prompt(issue), image).await {
        Ok(text) => text,
        Err(ModelError::Blocked(reason)) => {
            trace.log(AGENT, format!("❌ Image rejected by vision model: {reason}"));
            return Extraction::Unusable(reason);
        }
        Err(e) => {
            tracing::warn!(error = %e, "vision call failed, using fallback");
            trace.log(AGENT, format!("⚠️ Vision error: {e}. Using fallback assessment."));
            return Extraction::Recovered { data: fallback(issue), reason: e.to_string() };
        }
    };

    match parse_response(&reply, issue) {
        Ok((data, note)) => {
            if let Some(note) = note {
                trace.log(AGENT, note);
            }
            trace.log(
                AGENT,
                format!("Detected {} (Sev: {})", data.damage_type, data.severity),
            );
            Extraction::Extracted(data)
        }
        Err(reason) => {
            tracing::warn!(%reason, "vision reply unparseable, using fallback");
            trace.log(AGENT, format!("⚠️ Could not parse vision reply ({reason}). Using fallback assessment."));
            Extraction::Recovered { data: fallback(issue), reason }
        }
    }
}
