//! Built-in reference tables, embedded as TOML data assets.
//!
//! - `neuro_profiles.toml`: hormones and decay kinetics per emotion
//! - `scales.toml`: labelled intensity ladders per emotion
//! - `palette.toml`: presentation colors
//! - `insights.toml`: per-level clinical notes
//! - `glossary.toml`: hormone glossary, body sensation and thinking-trap catalogs
//!
//! Tables are parsed and validated once per process.

use crate::clinical::{ClinicalNotes, LevelInsight};
use crate::error::CoreError;
use crate::neuro::{EmotionNeuroProfile, Hormone};
use crate::palette::Palette;
use crate::scales::{EmotionLevel, EmotionScale};
use serde::Deserialize;
use std::sync::OnceLock;

const NEURO_PROFILES: &str = include_str!("../data/neuro_profiles.toml");
const SCALES: &str = include_str!("../data/scales.toml");
const PALETTE: &str = include_str!("../data/palette.toml");
const INSIGHTS: &str = include_str!("../data/insights.toml");
const GLOSSARY: &str = include_str!("../data/glossary.toml");

static BUILTIN: OnceLock<ReferenceData> = OnceLock::new();

#[derive(Deserialize)]
struct ProfileFile {
    emotion: Vec<ProfileEntry>,
}

#[derive(Deserialize)]
struct ProfileEntry {
    key: String,
    description: String,
    recovery_estimate: String,
    hormones: Vec<Hormone>,
}

#[derive(Deserialize)]
struct ScaleFile {
    emotion: Vec<EmotionScale>,
}

/// Read-only lookup over every static table the application ships with.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    profiles: Vec<(String, EmotionNeuroProfile)>,
    scales: Vec<EmotionScale>,
    palette: Palette,
    clinical: ClinicalNotes,
}

impl ReferenceData {
    /// The embedded tables, parsed on first use.
    pub fn builtin() -> Result<&'static ReferenceData, CoreError> {
        if let Some(data) = BUILTIN.get() {
            return Ok(data);
        }
        let data = Self::parse(NEURO_PROFILES, SCALES, PALETTE)?
            .with_clinical(ClinicalNotes::parse(INSIGHTS, GLOSSARY)?);
        Ok(BUILTIN.get_or_init(|| data))
    }

    /// Parse and validate reference tables from TOML sources. Clinical
    /// notes start empty; attach them with [`ReferenceData::with_clinical`].
    pub fn parse(profiles: &str, scales: &str, palette: &str) -> Result<Self, CoreError> {
        let profile_file: ProfileFile =
            toml::from_str(profiles).map_err(|source| CoreError::ReferenceData {
                asset: "neuro_profiles",
                source,
            })?;
        let scale_file: ScaleFile =
            toml::from_str(scales).map_err(|source| CoreError::ReferenceData {
                asset: "scales",
                source,
            })?;
        let palette: Palette =
            toml::from_str(palette).map_err(|source| CoreError::ReferenceData {
                asset: "palette",
                source,
            })?;

        let mut entries = Vec::with_capacity(profile_file.emotion.len());
        for entry in profile_file.emotion {
            let profile =
                EmotionNeuroProfile::new(entry.description, entry.recovery_estimate, entry.hormones);
            profile
                .validate()
                .map_err(|source| CoreError::InvalidProfile {
                    emotion: entry.key.clone(),
                    source,
                })?;
            for name in profile.hormone_names() {
                if palette.hormone_color(&entry.key, name).is_none() {
                    tracing::warn!("No palette color for hormone {} of {}", name, entry.key);
                }
            }
            entries.push((entry.key, profile));
        }

        tracing::debug!(
            "Loaded reference data: {} neuro profiles, {} scales",
            entries.len(),
            scale_file.emotion.len()
        );

        Ok(Self {
            profiles: entries,
            scales: scale_file.emotion,
            palette,
            clinical: ClinicalNotes::default(),
        })
    }

    pub fn with_clinical(mut self, clinical: ClinicalNotes) -> Self {
        self.clinical = clinical;
        self
    }

    /// Emotion keys in table order.
    pub fn emotion_keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|(k, _)| k.as_str())
    }

    pub fn neuro_profile(&self, key: &str) -> Option<&EmotionNeuroProfile> {
        self.profiles
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p)
    }

    pub fn require_profile(&self, key: &str) -> Result<&EmotionNeuroProfile, CoreError> {
        self.neuro_profile(key)
            .ok_or_else(|| CoreError::UnknownEmotion(key.to_string()))
    }

    pub fn scale(&self, key: &str) -> Option<&EmotionScale> {
        self.scales.iter().find(|s| s.key == key)
    }

    pub fn level(&self, key: &str, level: u8) -> Option<&EmotionLevel> {
        self.scale(key).and_then(|s| s.level(level))
    }

    /// Display name for an emotion key, falling back to the key itself.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.scale(key).map(|s| s.name.as_str()).unwrap_or(key)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn clinical(&self) -> &ClinicalNotes {
        &self.clinical
    }

    pub fn insight(&self, key: &str, level: u8) -> Option<&LevelInsight> {
        self.clinical.insight(key, level)
    }
}
