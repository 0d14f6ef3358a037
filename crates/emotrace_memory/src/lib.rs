//! # emotrace Memory
//!
//! Durable journal state for the emotional tracker:
//!
//! - **Store**: the async key-value contract with in-memory and SQLite backends
//! - **Journal**: assessments, theme preference and safety plan, with
//!   backup import/export
//! - **History**: pure analytics over stored assessments
//! - **Report**: the printable clinical report

pub mod history;
pub mod journal;
pub mod report;
mod sqlite;
mod store;

pub use history::{
    context_stats, daily_dominant, emotion_counts, trend, weekly_consistency, ContextStats,
    DayCell, DayCount, EmotionCount, HistoryFilter, TrendPoint,
};
pub use journal::{
    ExportEnvelope, ImportError, ImportOutcome, Journal, ASSESSMENTS_KEY, MAX_RECORD_ID,
    SAFETY_PLAN_KEY, THEME_KEY,
};
pub use report::{ClinicalReport, FrequencyRow, DEFAULT_REPORT_DAYS};
pub use sqlite::SqliteStore;
pub use store::{KeyValueStore, MemoryStore};
