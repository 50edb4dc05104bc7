//! External model capabilities used by the audit pipeline.
//!
//! The pipeline only sees the two traits below; `GeminiClient` is the
//! production implementation and tests plug in scripted stand-ins.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The service answered but refused to look at the input.
    #[error("model refused the request: {0}")]
    Blocked(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("no API key configured")]
    MissingApiKey,
}

/// Raw image bytes as uploaded by the citizen.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Model name, for trace messages.
    fn name(&self) -> &str;

    async fn analyze_image(&self, prompt: &str, image: &ImagePayload) -> Result<String, ModelError>;
}

#[async_trait]
pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
