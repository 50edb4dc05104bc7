//! Process configuration read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_STORE_PATH: &str = "civic_memory.json";
/// Request body cap. Phone photos arrive base64-encoded inside JSON.
pub const DEFAULT_MAX_BODY_MB: usize = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_body_bytes: usize,
    pub api_key: Option<String>,
    pub gemini_base: String,
    pub vision_model: String,
    pub plan_model: String,
    pub store_path: PathBuf,
    /// No timeout when unset.
    pub model_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Builds from any key lookup; empty values count as unset.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        Self {
            port: get("PORT").and_then(|s| s.parse().ok()).unwrap_or(8080),
            max_body_bytes: get("MAX_BODY_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|mb| *mb > 0)
                .unwrap_or(DEFAULT_MAX_BODY_MB)
                .saturating_mul(1024 * 1024),
            api_key: get("GOOGLE_API_KEY"),
            gemini_base: get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_GEMINI_BASE.into()),
            vision_model: get("VISION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            plan_model: get("PLAN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            store_path: get("COMPLAINT_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            model_timeout: get("MODEL_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    }
}
