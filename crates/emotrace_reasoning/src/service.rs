use crate::client::InsightClient;
use crate::digest::{analysis_schema, HistoryDigest, SYSTEM_INSTRUCTION};
use crate::error::AnalysisError;
use crate::providers::{GeminiClient, MockInsightClient};
use crate::retry::RetryConfig;
use anyhow::{Context, Result};
use emotrace_core::{AiConfig, AiProvider, AnalysisResult, Assessment, ReferenceData};
use std::sync::Arc;
use std::time::Duration;

/// Turns stored assessments into a narrative analysis through an
/// [`InsightClient`].
pub struct InsightService {
    client: Arc<dyn InsightClient>,
    reference: &'static ReferenceData,
    timeout: Duration,
    history_window: usize,
    min_records: usize,
}

impl InsightService {
    pub fn new(client: Arc<dyn InsightClient>, reference: &'static ReferenceData) -> Self {
        let defaults = AiConfig::default();
        Self {
            client,
            reference,
            timeout: Duration::from_secs(defaults.timeout_secs),
            history_window: defaults.history_window,
            min_records: defaults.min_records,
        }
    }

    /// Build the configured provider. Gemini needs an API key.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let reference = ReferenceData::builtin().context("Failed to load reference data")?;
        let client: Arc<dyn InsightClient> = match config.provider {
            AiProvider::Gemini => {
                let key = config.api_key.as_deref().context(
                    "No API key configured for Gemini (set GEMINI_API_KEY or API_KEY)",
                )?;
                Arc::new(
                    GeminiClient::new(key, &config.base_url, &config.model)?
                        .with_retry(RetryConfig::with_attempts(config.max_attempts)),
                )
            }
            AiProvider::Mock => Arc::new(MockInsightClient::new()),
        };
        tracing::info!("Analysis provider: {}", client.name());
        Ok(Self::new(client, reference)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_window(config.history_window, config.min_records))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_window(mut self, history_window: usize, min_records: usize) -> Self {
        self.history_window = history_window;
        self.min_records = min_records;
        self
    }

    /// Analyze the most recent records.
    ///
    /// The whole exchange, retries included, is bounded by the configured
    /// timeout. Nothing is sent when there are too few records.
    pub async fn analyze(&self, records: &[Assessment]) -> Result<AnalysisResult, AnalysisError> {
        let digest =
            HistoryDigest::build(records, self.reference, self.history_window, self.min_records)?;
        let prompt = digest.prompt();
        let schema = analysis_schema();

        tracing::info!(
            "Requesting analysis of {} records from {}",
            digest.len(),
            self.client.name()
        );

        let raw = tokio::time::timeout(
            self.timeout,
            self.client.complete_json(SYSTEM_INSTRUCTION, &prompt, &schema),
        )
        .await
        .map_err(|_| {
            tracing::warn!("Analysis timed out after {:?}", self.timeout);
            AnalysisError::Timeout(self.timeout)
        })?
        .map_err(|e| {
            tracing::warn!("Analysis failed: {:#}", e);
            AnalysisError::Service(format!("{:#}", e))
        })?;

        parse_analysis(&raw)
    }
}

/// Parse the model's answer, tolerating a surrounding markdown code fence.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!("Unparseable analysis response: {}", e);
        AnalysisError::MalformedResponse(e.to_string())
    })
}
