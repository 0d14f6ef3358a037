//! Condenses the journal into the compact history the analysis model sees,
//! and builds the prompt and response schema around it.

use crate::error::AnalysisError;
use emotrace_core::{Assessment, ReferenceData};
use serde::Serialize;
use serde_json::{json, Value};

pub const SYSTEM_INSTRUCTION: &str =
    "Você é um assistente clínico. Responda sempre em JSON válido seguindo o schema fornecido.";

const PROMPT_PREAMBLE: &str = "\
Atue como um psicólogo clínico experiente especializado em TCC (Terapia Cognitivo-Comportamental) e regulação emocional.
Analise os registros emocionais recentes do paciente fornecidos abaixo.

Identifique padrões sutis entre sono, energia, gatilhos e intensidade emocional.
Forneça uma análise empática, direta e profissional.

Dados do Paciente:
";

/// One record as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestEntry {
    pub date: String,
    /// Display name, falling back to the raw key.
    pub emotion: String,
    pub level: u8,
    pub sleep: f32,
    pub energy: f32,
    pub trigger: String,
    pub context: String,
    pub notes: String,
    pub strategies_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDigest {
    /// Newest first.
    pub entries: Vec<DigestEntry>,
}

impl HistoryDigest {
    /// Take the `window` most recent records, newest first.
    ///
    /// Fails with `InsufficientData` when fewer than `min_records` are
    /// available, so no request is made for a near-empty journal.
    pub fn build(
        records: &[Assessment],
        reference: &ReferenceData,
        window: usize,
        min_records: usize,
    ) -> Result<Self, AnalysisError> {
        if records.is_empty() || records.len() < min_records {
            return Err(AnalysisError::InsufficientData {
                found: records.len(),
                required: min_records.max(1),
            });
        }

        let mut recent: Vec<&Assessment> = records.iter().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(window.max(1));

        let entries = recent
            .into_iter()
            .map(|a| DigestEntry {
                date: a.timestamp.format("%d/%m/%Y %H:%M").to_string(),
                emotion: reference.display_name(&a.emotion).to_string(),
                level: a.level,
                sleep: a.context.sleep_hours,
                energy: a.context.energy,
                trigger: a.context.trigger.clone(),
                context: format!(
                    "{} with {}",
                    a.context.location,
                    a.context.company.join(", ")
                ),
                notes: a.context.notes.clone(),
                strategies_used: a.context.coping_strategies.join(", "),
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The user prompt: instructions followed by the digest as pretty JSON.
    pub fn prompt(&self) -> String {
        let data = serde_json::to_string_pretty(&self.entries).unwrap_or_else(|_| "[]".into());
        format!("{}{}", PROMPT_PREAMBLE, data)
    }
}

/// Response schema in the Gemini `responseSchema` dialect.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "Um parágrafo resumindo o estado emocional recente e insights principais."
            },
            "patterns": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Lista de 2 a 4 padrões identificados (ex: 'Sua ansiedade aumenta quando dorme menos de 6h')."
            },
            "suggestions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Lista de 2 a 3 estratégias comportamentais ou cognitivas específicas para o momento atual."
            },
            "moodTrend": {
                "type": "STRING",
                "enum": ["improving", "declining", "stable", "variable"],
                "description": "Tendência geral do humor baseada nos dados."
            }
        },
        "required": ["summary", "patterns", "suggestions", "moodTrend"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotrace_core::ContextData;

    fn record(ts: &str, emotion: &str, level: u8) -> Assessment {
        Assessment {
            id: None,
            pseudo_id: None,
            timestamp: ts.parse().unwrap(),
            emotion: emotion.into(),
            level,
            context: ContextData {
                location: "Casa".into(),
                company: vec!["Família".into(), "Pet".into()],
                coping_strategies: vec!["Respiração".into()],
                ..ContextData::default()
            },
        }
    }

    #[test]
    fn test_digest_newest_first_and_windowed() {
        let data = ReferenceData::builtin().unwrap();
        let records: Vec<Assessment> = (1..=20)
            .map(|d| record(&format!("2024-03-{:02}T10:00:00Z", d), "alegria", 4))
            .collect();
        let digest = HistoryDigest::build(&records, data, 15, 3).unwrap();
        assert_eq!(digest.len(), 15);
        assert_eq!(digest.entries[0].date, "20/03/2024 10:00");
        assert_eq!(digest.entries[14].date, "06/03/2024 10:00");
    }

    #[test]
    fn test_digest_entry_fields() {
        let data = ReferenceData::builtin().unwrap();
        let records = vec![
            record("2024-03-01T10:00:00Z", "alegria", 4),
            record("2024-03-02T10:00:00Z", "desconhecida", 2),
            record("2024-03-03T10:00:00Z", "medo", 6),
        ];
        let digest = HistoryDigest::build(&records, data, 15, 3).unwrap();
        let first = &digest.entries[0];
        assert_eq!(first.level, 6);
        assert_eq!(first.context, "Casa with Família, Pet");
        assert_eq!(first.strategies_used, "Respiração");
        // Unknown keys pass through untranslated
        assert_eq!(digest.entries[1].emotion, "desconhecida");
        assert_eq!(digest.entries[0].emotion, "Medo");
        assert_eq!(digest.entries[2].emotion, "Alegria");
    }

    #[test]
    fn test_digest_requires_minimum() {
        let data = ReferenceData::builtin().unwrap();
        let records = vec![record("2024-03-01T10:00:00Z", "alegria", 4)];
        assert_eq!(
            HistoryDigest::build(&records, data, 15, 3),
            Err(AnalysisError::InsufficientData {
                found: 1,
                required: 3
            })
        );
        assert!(matches!(
            HistoryDigest::build(&[], data, 15, 0),
            Err(AnalysisError::InsufficientData { found: 0, .. })
        ));
    }

    #[test]
    fn test_prompt_embeds_digest() {
        let data = ReferenceData::builtin().unwrap();
        let records = vec![
            record("2024-03-01T10:00:00Z", "alegria", 4),
            record("2024-03-02T10:00:00Z", "alegria", 5),
            record("2024-03-03T10:00:00Z", "alegria", 6),
        ];
        let prompt = HistoryDigest::build(&records, data, 15, 3).unwrap().prompt();
        assert!(prompt.starts_with("Atue como"));
        assert!(prompt.contains("\"strategies_used\": \"Respiração\""));
    }

    #[test]
    fn test_schema_lists_mood_trends() {
        let schema = analysis_schema();
        assert_eq!(schema["properties"]["moodTrend"]["enum"].as_array().unwrap().len(), 4);
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
    }
}
