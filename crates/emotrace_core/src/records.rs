//! User-authored records: emotional assessments, the safety plan, theme
//! preference, and the structured result of an AI history analysis.
//!
//! JSON field names follow the camelCase backup format so exported files
//! round-trip with older exports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Situational metadata captured alongside an emotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextData {
    pub location: String,
    pub company: Vec<String>,
    pub trigger: String,
    pub duration: String,
    pub coping_strategies: Vec<String>,
    pub body_sensations: Vec<String>,
    /// CBT cognitive distortions noticed during the episode.
    pub thinking_traps: Vec<String>,
    pub sleep_hours: f32,
    pub energy: f32,
    pub notes: String,
    pub secondary_emotion: Option<String>,
    pub secondary_level: u8,
    pub custom_valence: f32,
    pub custom_arousal: f32,
}

impl Default for ContextData {
    fn default() -> Self {
        Self {
            location: String::new(),
            company: Vec::new(),
            trigger: String::new(),
            duration: String::new(),
            coping_strategies: Vec::new(),
            body_sensations: Vec::new(),
            thinking_traps: Vec::new(),
            sleep_hours: 7.0,
            energy: 5.0,
            notes: String::new(),
            secondary_emotion: None,
            secondary_level: 0,
            custom_valence: 5.0,
            custom_arousal: 5.0,
        }
    }
}

/// A stored emotional event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Creation time in epoch milliseconds. Absent on anonymized records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudo_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Emotion key into the reference tables.
    pub emotion: String,
    pub level: u8,
    #[serde(flatten)]
    pub context: ContextData,
}

impl Assessment {
    /// Identity used when merging imports: the id, or the timestamp when
    /// the record carries no id.
    pub fn merge_key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.timestamp.to_rfc3339(),
        }
    }
}

/// An assessment as submitted by the user, before the journal assigns an
/// id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssessment {
    pub emotion: String,
    pub level: u8,
    pub context: ContextData,
    /// Backdated event time; `None` means now.
    pub custom_timestamp: Option<DateTime<Utc>>,
}

impl NewAssessment {
    pub fn new(emotion: impl Into<String>, level: u8) -> Self {
        Self {
            emotion: emotion.into(),
            level,
            context: ContextData::default(),
            custom_timestamp: None,
        }
    }

    pub fn with_context(mut self, context: ContextData) -> Self {
        self.context = context;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.custom_timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}', expected light or dark", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
}

/// Crisis plan: who to call, a coping phrase, and a safe place to go to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyPlan {
    #[serde(default)]
    pub contacts: Vec<SafetyContact>,
    #[serde(default, rename = "copingPhantom")]
    pub coping_phrase: String,
    #[serde(default)]
    pub safe_place: String,
}

impl Default for SafetyPlan {
    fn default() -> Self {
        Self {
            contacts: Vec::new(),
            coping_phrase: "Isso é temporário. Eu já sobrevivi a dias difíceis antes.".to_string(),
            safe_place: "Meu quarto, ouvindo chuva.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
    Variable,
}

/// Narrative summary returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub patterns: Vec<String>,
    pub suggestions: Vec<String>,
    pub mood_trend: MoodTrend,
}
