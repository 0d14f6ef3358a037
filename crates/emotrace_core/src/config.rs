use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmotraceConfig {
    pub simulation: SimulationConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
}

impl EmotraceConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: EmotraceConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("EMOTRACE_DB") {
            self.storage.db_path = v;
        }
        if let Ok(v) = std::env::var("EMOTRACE_AI_MODEL") {
            self.ai.model = v;
        }
        if let Ok(v) = std::env::var("EMOTRACE_AI_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Ok(v) = std::env::var("EMOTRACE_AI_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.ai.timeout_secs = n;
            }
        }
        // GEMINI_API_KEY wins over the generic API_KEY
        if let Ok(v) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            if !v.is_empty() {
                self.ai.api_key = Some(v);
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Upper bound on the pre-rumination horizon, in minutes. `0` (or
    /// `None` when built in code) keeps the horizon unbounded for very slow
    /// decay rates.
    pub max_base_horizon_minutes: Option<u32>,
}

impl SimulationConfig {
    /// The effective horizon cap, with `0` read as "no cap".
    pub fn horizon_cap(&self) -> Option<u32> {
        self.max_base_horizon_minutes.filter(|&minutes| minutes > 0)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_base_horizon_minutes: Some(24 * 60),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "emotrace.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    #[default]
    Gemini,
    /// Canned responses, no network.
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub model: String,
    pub base_url: String,
    /// Never read from the file in practice; populated from the environment.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Attempts per request, including the first.
    pub max_attempts: u32,
    /// How many of the most recent records are sent for analysis.
    pub history_window: usize,
    /// Fewer records than this in scope and no analysis is attempted.
    pub min_records: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            model: "gemini-3-flash-preview".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            timeout_secs: 30,
            max_attempts: 3,
            history_window: 15,
            min_records: 3,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EmotraceConfig::default();
        assert_eq!(cfg.simulation.max_base_horizon_minutes, Some(1440));
        assert_eq!(cfg.storage.db_path, "emotrace.db");
        assert_eq!(cfg.ai.provider, AiProvider::Gemini);
        assert_eq!(cfg.ai.history_window, 15);
        assert_eq!(cfg.ai.min_records, 3);
        assert!(cfg.ai.api_key.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[ai]
provider = "mock"
"#;
        let cfg: EmotraceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.ai.provider, AiProvider::Mock);
        // Defaults for unspecified fields
        assert_eq!(cfg.ai.timeout_secs, 30);
        assert_eq!(cfg.storage.db_path, "emotrace.db");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[simulation]
max_base_horizon_minutes = 720

[storage]
db_path = "data/journal.db"

[ai]
provider = "gemini"
model = "gemini-2.0-flash"
base_url = "http://localhost:9000"
timeout_secs = 5
max_attempts = 1
history_window = 10
min_records = 2
"#;
        let cfg: EmotraceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.simulation.max_base_horizon_minutes, Some(720));
        assert_eq!(cfg.storage.db_path, "data/journal.db");
        assert_eq!(cfg.ai.model, "gemini-2.0-flash");
        assert_eq!(cfg.ai.base_url, "http://localhost:9000");
        assert_eq!(cfg.ai.timeout_secs, 5);
        assert_eq!(cfg.ai.max_attempts, 1);
        assert_eq!(cfg.ai.history_window, 10);
        assert_eq!(cfg.ai.min_records, 2);
    }

    #[test]
    fn test_zero_horizon_cap_means_uncapped() {
        let toml_str = r#"
[simulation]
max_base_horizon_minutes = 0
"#;
        let cfg: EmotraceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.simulation.max_base_horizon_minutes, Some(0));
        assert_eq!(cfg.simulation.horizon_cap(), None);

        let cfg: EmotraceConfig = toml::from_str("[simulation]\n").unwrap();
        assert_eq!(cfg.simulation.horizon_cap(), Some(1440));
    }

    #[test]
    fn test_parse_empty_toml() {
        let cfg: EmotraceConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.ai.max_attempts, 3);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let cfg = EmotraceConfig::load_or_default("/tmp/nonexistent_emotrace_config_98765.toml");
        assert_eq!(cfg.simulation.max_base_horizon_minutes, Some(1440));
    }
}
