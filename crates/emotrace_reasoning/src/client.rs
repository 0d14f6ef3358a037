use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A text model that answers with a JSON document.
#[async_trait]
pub trait InsightClient: Send + Sync {
    /// Send `prompt` under the `system` instruction and return the raw JSON
    /// text of the answer. `schema` describes the expected document.
    async fn complete_json(&self, system: &str, prompt: &str, schema: &Value) -> Result<String>;

    fn name(&self) -> &str;
}
