//! # mj-gemini
//!
//! HTTP client for the Gemini `generateContent` endpoint, implementing
//! `TextGenerator`. Responses are parsed into typed schemas; anything that does
//! not carry a non-empty text candidate is an upstream error.

use std::time::Duration;

use async_trait::async_trait;
use mj_core::error::{AppError, Result};
use mj_core::traits::TextGenerator;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection parameters, usually taken from the settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { temperature: 0.7, top_k: 40, top_p: 0.95, max_output_tokens: 2048 }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// A thin wrapper around reqwest Client for Gemini requests.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url.trim_end_matches('/'), self.config.model)
    }
}

/// Extracts the first candidate's text from a response body.
fn parse_completion(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        let reason = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
        return Err(AppError::Upstream(format!("Gemini API error: {reason}")));
    }

    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Upstream(format!("Invalid response format from Gemini API: {e}")))?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Upstream("Invalid response format from Gemini API".into()))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let Some(key) = self.config.api_key.as_deref() else {
            return Err(AppError::Upstream("GEMINI_API_KEY is not configured".into()));
        };

        let body = GenerateRequest {
            contents: [Content { parts: [RequestPart { text: prompt }] }],
            generation_config: GenerationConfig::default(),
        };

        log::debug!("POST {} ({} prompt chars)", self.endpoint(), prompt.len());
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Gemini request failed: {e}");
                AppError::Upstream(format!("Failed to reach Gemini API: {e}"))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read Gemini response: {e}")))?;

        parse_completion(status, &text).inspect_err(|e| log::warn!("⚠️ {e}"))
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}
