use crate::client::InsightClient;
use crate::retry::{is_retryable_status, with_retry, AttemptError, RetryConfig};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Google Gemini `generateContent` with structured JSON output.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "Gemini API key is empty");
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .context("Failed to build HTTP client")?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(system: &str, prompt: &str, schema: &Value) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        })
    }

    async fn attempt(&self, body: &Value) -> Result<String, AttemptError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let msg = format!("Gemini API error ({}): {}", status, text);
            return Err(if is_retryable_status(status) {
                AttemptError::Transient(msg)
            } else {
                AttemptError::Fatal(anyhow::anyhow!(msg))
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Fatal(anyhow::anyhow!("Invalid Gemini response: {}", e)))?;
        extract_text(parsed).map_err(AttemptError::Fatal)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    anyhow::ensure!(!text.trim().is_empty(), "Gemini returned no text");
    Ok(text)
}

#[async_trait::async_trait]
impl InsightClient for GeminiClient {
    async fn complete_json(&self, system: &str, prompt: &str, schema: &Value) -> Result<String> {
        let body = Self::request_body(system, prompt, schema);
        tracing::debug!("Gemini request to {} ({} chars)", self.model, prompt.len());
        with_retry(&self.retry, "Gemini", || self.attempt(&body)).await
    }

    fn name(&self) -> &str {
        &self.model
    }
}
