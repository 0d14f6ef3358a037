//! Intensity scales: the labelled 1–7 ladder for each emotion category.
//!
//! Valence and arousal are on the 0–10 scale used by the circumplex view;
//! they are presentation metrics and play no part in the decay simulation.

use serde::{Deserialize, Serialize};

/// Lowest selectable intensity level.
pub const MIN_LEVEL: u8 = 1;
/// Highest selectable intensity level; reaches 100% amplitude in simulations.
pub const MAX_LEVEL: u8 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionLevel {
    pub level: u8,
    pub label: String,
    pub valence: f32,
    pub arousal: f32,
    pub description: String,
    pub examples: String,
    pub regulation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScale {
    pub key: String,
    /// Display name ("Alegria", "Medo", ...)
    pub name: String,
    pub valence_base: f32,
    pub levels: Vec<EmotionLevel>,
}

impl EmotionScale {
    /// Look up a level by its number. Some scales stop short of seven.
    pub fn level(&self, level: u8) -> Option<&EmotionLevel> {
        self.levels.iter().find(|l| l.level == level)
    }

    pub fn max_level(&self) -> u8 {
        self.levels.iter().map(|l| l.level).max().unwrap_or(0)
    }
}

pub fn is_valid_level(level: u8) -> bool {
    (MIN_LEVEL..=MAX_LEVEL).contains(&level)
}
