//! Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{GenerationClient, GenerationRequest};
use crate::error::{Result, SwarmError};
use crate::models::{Credentials, ModelConfig};

/// Gemini API client, built once and shared by every agent
pub struct GeminiClient {
    client: reqwest::Client,
    config: ModelConfig,
    credentials: Credentials,
}

impl GeminiClient {
    pub fn new(config: ModelConfig, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SwarmError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        tracing::info!(model = %config.model_id(), "Gemini client initialized");
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model_id()
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(self.credentials.api_key())
            .map_err(|_| SwarmError::Configuration("API key is not a valid header value".to_string()))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Pull the candidate text out of a decoded response body
fn response_text(parsed: GeminiResponse) -> Result<String> {
    if let Some(error) = parsed.error {
        return Err(SwarmError::Generation(format!(
            "Gemini API error: {}",
            error.message
        )));
    }

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(SwarmError::Generation(format!(
            "prompt blocked by Gemini: {}",
            reason
        )));
    }

    let text: String = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .concat()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(SwarmError::Generation("No content in response".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt,
                }],
            }],
        };

        tracing::debug!(role = %request.role, model = %self.config.model_id(), "generateContent");

        let response = self
            .client
            .post(self.build_url())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| SwarmError::Generation(format!("http error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SwarmError::Generation(format!("HTTP {}: {}", status, text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SwarmError::Generation(format!("http error: {}", e)))?;

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| SwarmError::Generation(format!("undecodable response body: {}", e)))?;

        response_text(parsed)
    }
}
