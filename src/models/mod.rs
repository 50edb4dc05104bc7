//! Complaint records, catalogs and the serde formats shared with store files.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ───────────────────────────────────────
// Catalogs
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    #[serde(rename = "Pothole")]
    Pothole,
    #[serde(rename = "Water Leakage")]
    WaterLeakage,
    #[serde(rename = "Streetlight Malfunction")]
    StreetlightMalfunction,
    #[serde(rename = "Garbage Accumulation")]
    GarbageAccumulation,
    #[serde(rename = "Drainage Block")]
    DrainageBlock,
    #[serde(rename = "Road Damage")]
    RoadDamage,
    #[serde(rename = "Manhole Issue")]
    ManholeIssue,
    #[serde(rename = "Other")]
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 8] = [
        IssueType::Pothole,
        IssueType::WaterLeakage,
        IssueType::StreetlightMalfunction,
        IssueType::GarbageAccumulation,
        IssueType::DrainageBlock,
        IssueType::RoadDamage,
        IssueType::ManholeIssue,
        IssueType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IssueType::Pothole => "Pothole",
            IssueType::WaterLeakage => "Water Leakage",
            IssueType::StreetlightMalfunction => "Streetlight Malfunction",
            IssueType::GarbageAccumulation => "Garbage Accumulation",
            IssueType::DrainageBlock => "Drainage Block",
            IssueType::RoadDamage => "Road Damage",
            IssueType::ManholeIssue => "Manhole Issue",
            IssueType::Other => "Other",
        }
    }

    /// Case-insensitive match against the catalog labels.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.label().to_lowercase() == wanted)
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Submitted,
    Acknowledged,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::Submitted,
        ComplaintStatus::Acknowledged,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "SUBMITTED",
            ComplaintStatus::Acknowledged => "ACKNOWLEDGED",
            ComplaintStatus::InProgress => "IN_PROGRESS",
            ComplaintStatus::Resolved => "RESOLVED",
            ComplaintStatus::Rejected => "REJECTED",
        }
    }

    /// Human label for the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "Submitted",
            ComplaintStatus::Acknowledged => "Acknowledged",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|st| st.as_str() == wanted)
    }

    /// Still waiting on the authority.
    pub fn is_open(self) -> bool {
        !matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Rejected)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Critical,
    High,
    Moderate,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Urgency::Critical => "CRITICAL",
            Urgency::High => "HIGH",
            Urgency::Moderate => "MODERATE",
        })
    }
}

// ───────────────────────────────────────
// Assessment payloads
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct HazardFlags {
    pub near_school: bool,
    pub heavy_traffic: bool,
    pub water_leak: bool,
    pub monsoon_critical: bool,
}

impl HazardFlags {
    /// Lenient read of a model-produced metadata object: anything that is
    /// not literally `true` counts as false.
    pub fn from_value(v: &serde_json::Value) -> Self {
        let flag = |key: &str| v.get(key).and_then(|f| f.as_bool()).unwrap_or(false);
        Self {
            near_school: flag("near_school"),
            heavy_traffic: flag("heavy_traffic"),
            water_leak: flag("water_leak"),
            monsoon_critical: flag("monsoon_critical"),
        }
    }
}

impl From<serde_json::Value> for HazardFlags {
    fn from(v: serde_json::Value) -> Self {
        Self::from_value(&v)
    }
}

/// Reads a severity the way models (and older store files) write it: an
/// integer, a float or a numeric string. Floats are rounded.
pub fn severity_from_value(v: &serde_json::Value) -> Option<i64> {
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then(|| n.round() as i64)
}

fn lenient_severity<'de, D: serde::Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let raw = serde_json::Value::deserialize(d)?;
    severity_from_value(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("severity is not numeric: {raw}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionData {
    #[serde(default)]
    pub damage_type: String,
    #[serde(deserialize_with = "lenient_severity")]
    pub severity: i64, // 1..=10
    #[serde(default)]
    pub metadata: HazardFlags,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskData {
    pub risk_index: u8, // 0..=100
    pub urgency: Urgency,
}

// ───────────────────────────────────────
// Complaint record
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ComplaintStatus,
    #[serde(with = "local_ts")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub complaint_id: String,
    #[serde(with = "local_ts")]
    pub timestamp: NaiveDateTime,
    pub location: String,
    pub issue_type: String,
    pub citizen_name: String,
    pub citizen_phone: String,
    pub vision_data: VisionData,
    pub risk_data: RiskData,
    pub action_plan: String,
    #[serde(default)]
    pub context: String,
    pub status: ComplaintStatus,
    pub status_history: Vec<StatusEntry>,
    #[serde(default)]
    pub authority_notes: String,
}

impl ComplaintRecord {
    /// Moves the record to `status`, appending exactly one history entry.
    /// Empty notes leave the previous notes in place.
    pub fn transition(&mut self, status: ComplaintStatus, notes: &str, at: NaiveDateTime) {
        self.status = status;
        self.status_history.push(StatusEntry { status, timestamp: at });
        if !notes.is_empty() {
            self.authority_notes = notes.to_string();
        }
    }
}

// ───────────────────────────────────────
// Session trace (never persisted)
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub agent: String,
    pub timestamp: String, // HH:MM:SS
    pub message: String,
}

/// `YYYY-MM-DD HH:MM:SS` local wall-clock strings, as found in existing store files.
pub mod local_ts {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
