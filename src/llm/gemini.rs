//! Gemini `generateContent` REST client.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ImagePayload, ModelError, TextModel, VisionModel};

const USER_AGENT: &str = concat!("jansahayak-api/", env!("CARGO_PKG_VERSION"));

// Types to deserialize the generateContent response
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}
#[derive(Deserialize)]
struct Candidate { content: Option<Content> }
#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}
#[derive(Deserialize)]
struct Part { text: Option<String> }
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback { block_reason: Option<String> }

#[derive(Serialize)]
struct InlineData<'a> { mime_type: &'a str, data: String }

/// One model on the Gemini REST API. Vision and planning each get their own
/// instance so they can run different models.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// `base_url` like `https://generativelanguage.googleapis.com` (no trailing slash).
    /// `timeout = None` leaves requests unbounded.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ModelError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_content(&self, parts: serde_json::Value) -> Result<String, ModelError> {
        let key = self.api_key.as_deref().ok_or(ModelError::MissingApiKey)?;
        let body = json!({ "contents": [{ "role": "user", "parts": parts }] });

        tracing::debug!(model = %self.model, "calling generateContent");
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Api { status: status.as_u16(), body });
        }

        let parsed: GenerateResponse = resp.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(resp: GenerateResponse) -> Result<String, ModelError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ModelError::Blocked(reason));
    }
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl VisionModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn analyze_image(&self, prompt: &str, image: &ImagePayload) -> Result<String, ModelError> {
        let inline = InlineData {
            mime_type: &image.mime_type,
            data: general_purpose::STANDARD.encode(&image.bytes),
        };
        self.generate_content(json!([{ "text": prompt }, { "inline_data": inline }]))
            .await
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.generate_content(json!([{ "text": prompt }])).await
    }
}
