//! Clinical reference text: per-level insight notes, the hormone glossary,
//! and the body sensation and thinking-trap catalogs offered when logging.
//!
//! Parsed from `insights.toml` and `glossary.toml`.

use crate::error::CoreError;
use crate::scales::is_valid_level;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What an emotion looks like at one intensity level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInsight {
    pub emotion: String,
    pub level: u8,
    /// A short vignette of someone at this level.
    pub example: String,
    /// The neurochemistry behind it.
    pub science: String,
    pub body_changes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub name: String,
    /// One-phrase summary of what the hormone does.
    pub function: String,
    pub color: String,
}

/// A CBT cognitive distortion, stored on assessments by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingTrap {
    pub id: String,
    pub label: String,
    pub description: String,
}

#[derive(Deserialize)]
struct InsightFile {
    #[serde(default)]
    insight: Vec<LevelInsight>,
}

#[derive(Deserialize)]
struct GlossaryFile {
    #[serde(default)]
    hormone: Vec<GlossaryEntry>,
    #[serde(default)]
    catalog: Catalog,
    #[serde(default)]
    thinking_trap: Vec<ThinkingTrap>,
}

#[derive(Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    body_sensations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClinicalNotes {
    insights: Vec<LevelInsight>,
    glossary: Vec<GlossaryEntry>,
    body_sensations: Vec<String>,
    thinking_traps: Vec<ThinkingTrap>,
}

impl ClinicalNotes {
    /// Parse both assets. Each (emotion, level) pair may appear once and
    /// levels must be on the 1-7 scale.
    pub fn parse(insights: &str, glossary: &str) -> Result<Self, CoreError> {
        let insight_file: InsightFile =
            toml::from_str(insights).map_err(|source| CoreError::ReferenceData {
                asset: "insights",
                source,
            })?;
        let glossary_file: GlossaryFile =
            toml::from_str(glossary).map_err(|source| CoreError::ReferenceData {
                asset: "glossary",
                source,
            })?;

        let mut seen = HashSet::new();
        for insight in &insight_file.insight {
            if !is_valid_level(insight.level) || !seen.insert((&insight.emotion, insight.level)) {
                return Err(CoreError::InvalidInsight {
                    emotion: insight.emotion.clone(),
                    level: insight.level,
                });
            }
        }

        Ok(Self {
            insights: insight_file.insight,
            glossary: glossary_file.hormone,
            body_sensations: glossary_file.catalog.body_sensations,
            thinking_traps: glossary_file.thinking_trap,
        })
    }

    pub fn insight(&self, emotion: &str, level: u8) -> Option<&LevelInsight> {
        self.insights
            .iter()
            .find(|i| i.emotion == emotion && i.level == level)
    }

    /// Hormones in glossary order.
    pub fn glossary(&self) -> &[GlossaryEntry] {
        &self.glossary
    }

    pub fn glossary_entry(&self, hormone: &str) -> Option<&GlossaryEntry> {
        self.glossary.iter().find(|g| g.name == hormone)
    }

    pub fn body_sensations(&self) -> &[String] {
        &self.body_sensations
    }

    pub fn thinking_traps(&self) -> &[ThinkingTrap] {
        &self.thinking_traps
    }

    pub fn thinking_trap(&self, id: &str) -> Option<&ThinkingTrap> {
        self.thinking_traps.iter().find(|t| t.id == id)
    }
}
