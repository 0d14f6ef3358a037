//! Mock analysis provider: canned answers for tests and offline use.

use crate::client::InsightClient;
use anyhow::Result;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const CANNED_ANALYSIS: &str = r#"{
  "summary": "(Mock) Registros recentes mostram oscilações moderadas de humor.",
  "patterns": ["Intensidade maior em dias com menos de 6h de sono"],
  "suggestions": ["Manter horário regular de sono", "Praticar respiração 4-7-8"],
  "moodTrend": "stable"
}"#;

#[derive(Debug)]
pub struct MockInsightClient {
    response: Result<String, String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockInsightClient {
    pub fn new() -> Self {
        Self {
            response: Ok(CANNED_ANALYSIS.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer with this raw text instead of the canned analysis.
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.response = Ok(text.into());
        self
    }

    /// Fail every call with this message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.response = Err(message.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockInsightClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InsightClient for MockInsightClient {
    async fn complete_json(&self, _system: &str, _prompt: &str, _schema: &Value) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(msg) => anyhow::bail!("{}", msg),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
