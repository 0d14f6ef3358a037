//! # emotrace core
//!
//! Shared domain for the emotional self-tracking journal:
//!
//! - **Neuro profiles**: per-emotion hormones with rise/decay kinetics,
//!   consumed by the decay simulation in `emotrace_limbic`
//! - **Scales**: the labelled 1–7 intensity ladder per emotion
//! - **Records**: assessments, safety plan, theme, AI analysis result
//! - **Clinical notes**: per-level insights, hormone glossary, logging catalogs
//! - **Reference data**: the embedded static tables
//! - **Config**: TOML configuration with env overrides

pub mod clinical;
pub mod config;
pub mod error;
pub mod neuro;
pub mod palette;
pub mod records;
pub mod reference;
pub mod scales;

pub use clinical::{ClinicalNotes, GlossaryEntry, LevelInsight, ThinkingTrap};
pub use config::{AiConfig, AiProvider, EmotraceConfig, SimulationConfig, StorageConfig};
pub use error::{CoreError, ProfileError};
pub use neuro::{DecayProfile, EmotionNeuroProfile, Hormone};
pub use palette::{EmotionPalette, Palette};
pub use records::{
    AnalysisResult, Assessment, ContextData, MoodTrend, NewAssessment, SafetyContact, SafetyPlan,
    Theme,
};
pub use reference::ReferenceData;
pub use scales::{is_valid_level, EmotionLevel, EmotionScale, MAX_LEVEL, MIN_LEVEL};
