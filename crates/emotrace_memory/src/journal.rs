//! The assessment journal: persistence of emotional records, preferences
//! and the safety plan on top of any [`KeyValueStore`].
//!
//! Records live under a single key as a JSON array, ascending by timestamp.
//! Mutations are serialized through a write lock so concurrent saves cannot
//! lose each other's records.

use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use emotrace_core::{is_valid_level, Assessment, NewAssessment, SafetyPlan, Theme};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::Mutex;

pub const ASSESSMENTS_KEY: &str = "emotional_assessments";
pub const THEME_KEY: &str = "theme_preference";
pub const SAFETY_PLAN_KEY: &str = "safety_plan_v1";

/// Largest id an imported record may carry: 9999-12-31T23:59:59.999Z in
/// epoch milliseconds.
pub const MAX_RECORD_ID: i64 = 253_402_300_799_999;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("backup is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("backup must be an array of assessments or an object with an `assessments` array")]
    NotAnArray,

    #[error("backup contains no valid assessments")]
    NoValidRecords,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Records that were not already in the journal.
    pub added: usize,
    /// Valid records in the backup that matched an existing record.
    pub skipped: usize,
    /// Entries dropped for a missing timestamp or emotion, a level outside
    /// 1-7, or an id outside `1..=MAX_RECORD_ID`.
    pub invalid: usize,
}

/// Shape of an exported backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub exported_at: DateTime<Utc>,
    pub assessments: Vec<Assessment>,
}

pub struct Journal<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> Journal<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All records, ascending by timestamp. A corrupt blob reads as empty.
    pub async fn assessments(&self) -> Result<Vec<Assessment>> {
        let Some(raw) = self.store.get(ASSESSMENTS_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Assessment>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!("Stored assessments are unreadable, treating as empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Look up one record by id.
    pub async fn get(&self, id: i64) -> Result<Option<Assessment>> {
        Ok(self
            .assessments()
            .await?
            .into_iter()
            .find(|a| a.id == Some(id)))
    }

    /// Stamp and persist a new assessment.
    ///
    /// The id is the current epoch milliseconds, bumped past the largest
    /// existing id so ids stay unique even for saves within one millisecond.
    pub async fn save(&self, new: NewAssessment) -> Result<Assessment> {
        anyhow::ensure!(!new.emotion.trim().is_empty(), "emotion must not be empty");
        anyhow::ensure!(
            is_valid_level(new.level),
            "level {} is outside the 1-7 scale",
            new.level
        );

        let _guard = self.write_lock.lock().await;
        let mut records = self.assessments().await?;

        let now = Utc::now();
        let max_id = records.iter().filter_map(|a| a.id).max().unwrap_or(0);
        let next = max_id.checked_add(1).context("assessment ids exhausted")?;
        let id = now.timestamp_millis().max(next);

        let record = Assessment {
            id: Some(id),
            pseudo_id: None,
            timestamp: new.custom_timestamp.unwrap_or(now),
            emotion: new.emotion,
            level: new.level,
            context: new.context,
        };
        records.push(record.clone());
        sort_by_time(&mut records);
        self.write(&records).await?;

        tracing::info!(
            "Saved assessment {} ({} level {})",
            id,
            record.emotion,
            record.level
        );
        Ok(record)
    }

    /// Returns true if a record with this id existed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.assessments().await?;
        let before = records.len();
        records.retain(|a| a.id != Some(id));
        if records.len() == before {
            return Ok(false);
        }
        self.write(&records).await?;
        tracing::info!("Deleted assessment {}", id);
        Ok(true)
    }

    /// Remove every assessment. Theme and safety plan are kept.
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let count = self.assessments().await?.len();
        self.store.delete(ASSESSMENTS_KEY).await?;
        tracing::info!("Cleared {} assessments", count);
        Ok(count)
    }

    /// Merge a backup into the journal.
    ///
    /// Accepts a bare array or an object with an `assessments` array.
    /// Entries without a timestamp or emotion, with a level outside 1-7, or
    /// with an id outside `1..=MAX_RECORD_ID` are dropped.
    /// Records already present (by id, or by timestamp when the id is
    /// missing) are skipped. The merged journal is re-sorted by time.
    pub async fn import(&self, json: &str) -> Result<ImportOutcome, ImportError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let items = match value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("assessments") {
                Some(serde_json::Value::Array(items)) => items,
                _ => return Err(ImportError::NotAnArray),
            },
            _ => return Err(ImportError::NotAnArray),
        };

        let total = items.len();
        let valid: Vec<Assessment> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Assessment>(item).ok())
            .filter(|a| !a.emotion.trim().is_empty())
            .filter(|a| is_valid_level(a.level))
            .filter(|a| a.id.map_or(true, |id| (1..=MAX_RECORD_ID).contains(&id)))
            .collect();
        let invalid = total - valid.len();
        if valid.is_empty() {
            return Err(ImportError::NoValidRecords);
        }

        let _guard = self.write_lock.lock().await;
        let mut records = self.assessments().await?;
        let mut seen: HashSet<String> = records.iter().map(Assessment::merge_key).collect();

        let mut added = 0;
        let mut skipped = 0;
        for record in valid {
            if seen.insert(record.merge_key()) {
                records.push(record);
                added += 1;
            } else {
                skipped += 1;
            }
        }

        if added > 0 {
            sort_by_time(&mut records);
            self.write(&records).await?;
        }

        tracing::info!(
            "Imported {} assessments ({} duplicates, {} invalid)",
            added,
            skipped,
            invalid
        );
        Ok(ImportOutcome {
            added,
            skipped,
            invalid,
        })
    }

    /// Serialize the whole journal as a pretty-printed backup.
    pub async fn export(&self) -> Result<String> {
        let envelope = ExportEnvelope {
            exported_at: Utc::now(),
            assessments: self.assessments().await?,
        };
        serde_json::to_string_pretty(&envelope).context("Failed to serialize export")
    }

    /// Export with identifying data removed: ids become random pseudonyms
    /// and free-text notes and triggers are blanked. The stored journal is
    /// not modified.
    pub async fn export_anonymized(&self) -> Result<String> {
        let assessments = self
            .assessments()
            .await?
            .into_iter()
            .map(anonymize)
            .collect();
        let envelope = ExportEnvelope {
            exported_at: Utc::now(),
            assessments,
        };
        serde_json::to_string_pretty(&envelope).context("Failed to serialize anonymized export")
    }

    pub async fn theme(&self) -> Result<Theme> {
        match self.store.get(THEME_KEY).await? {
            Some(raw) => Ok(raw.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring stored theme: {}", e);
                Theme::default()
            })),
            None => Ok(Theme::default()),
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, &theme.to_string()).await
    }

    /// The stored safety plan. Missing or non-object payloads read as the
    /// default plan.
    pub async fn safety_plan(&self) -> Result<SafetyPlan> {
        let Some(raw) = self.store.get(SAFETY_PLAN_KEY).await? else {
            return Ok(SafetyPlan::default());
        };
        let parsed = serde_json::from_str::<serde_json::Value>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|value| match value {
                serde_json::Value::Object(_) => {
                    serde_json::from_value::<SafetyPlan>(value).map_err(|e| e.to_string())
                }
                other => Err(format!("expected an object, found {}", other)),
            });
        match parsed {
            Ok(plan) => Ok(plan),
            Err(e) => {
                tracing::warn!("Stored safety plan is unreadable, using default: {}", e);
                Ok(SafetyPlan::default())
            }
        }
    }

    pub async fn set_safety_plan(&self, plan: &SafetyPlan) -> Result<()> {
        let raw = serde_json::to_string(plan).context("Failed to serialize safety plan")?;
        self.store.set(SAFETY_PLAN_KEY, &raw).await
    }

    async fn write(&self, records: &[Assessment]) -> Result<()> {
        let raw = serde_json::to_string(records).context("Failed to serialize assessments")?;
        self.store.set(ASSESSMENTS_KEY, &raw).await
    }
}

fn sort_by_time(records: &mut [Assessment]) {
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

fn anonymize(mut record: Assessment) -> Assessment {
    record.id = None;
    record.pseudo_id = Some(format!("anon-{}", uuid::Uuid::new_v4().simple()));
    record.context.notes.clear();
    record.context.trigger.clear();
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use emotrace_core::ContextData;

    fn journal() -> Journal<MemoryStore> {
        Journal::new(MemoryStore::new())
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_empty_journal() {
        let j = journal();
        assert!(j.assessments().await.unwrap().is_empty());
        assert_eq!(j.theme().await.unwrap(), Theme::Dark);
        assert_eq!(j.safety_plan().await.unwrap(), SafetyPlan::default());
    }

    #[tokio::test]
    async fn test_save_assigns_unique_increasing_ids() {
        let j = journal();
        let a = j.save(NewAssessment::new("alegria", 5)).await.unwrap();
        let b = j.save(NewAssessment::new("medo", 3)).await.unwrap();
        assert!(b.id.unwrap() > a.id.unwrap());
        assert_eq!(j.assessments().await.unwrap().len(), 2);
        assert_eq!(j.get(a.id.unwrap()).await.unwrap().unwrap().emotion, "alegria");
    }

    #[tokio::test]
    async fn test_save_backdated_sorts_by_time() {
        let j = journal();
        j.save(NewAssessment::new("alegria", 5).at(at("2024-03-02T10:00:00Z")))
            .await
            .unwrap();
        j.save(NewAssessment::new("tristeza", 2).at(at("2024-03-01T10:00:00Z")))
            .await
            .unwrap();
        let records = j.assessments().await.unwrap();
        assert_eq!(records[0].emotion, "tristeza");
        assert_eq!(records[1].emotion, "alegria");
    }

    #[tokio::test]
    async fn test_save_rejects_bad_level() {
        let j = journal();
        assert!(j.save(NewAssessment::new("alegria", 0)).await.is_err());
        assert!(j.save(NewAssessment::new("alegria", 8)).await.is_err());
        assert!(j.save(NewAssessment::new("  ", 3)).await.is_err());
        assert!(j.assessments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let j = journal();
        let a = j.save(NewAssessment::new("alegria", 5)).await.unwrap();
        j.save(NewAssessment::new("medo", 3)).await.unwrap();
        j.set_theme(Theme::Light).await.unwrap();

        assert!(j.delete(a.id.unwrap()).await.unwrap());
        assert!(!j.delete(a.id.unwrap()).await.unwrap());
        assert_eq!(j.assessments().await.unwrap().len(), 1);

        assert_eq!(j.clear().await.unwrap(), 1);
        assert!(j.assessments().await.unwrap().is_empty());
        assert_eq!(j.theme().await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn test_import_bare_array_and_envelope() {
        let j = journal();
        let bare = r#"[
            {"id": 2, "timestamp": "2024-01-02T00:00:00Z", "emotion": "medo", "level": 4},
            {"id": 1, "timestamp": "2024-01-01T00:00:00Z", "emotion": "alegria", "level": 6}
        ]"#;
        let outcome = j.import(bare).await.unwrap();
        assert_eq!(outcome.added, 2);

        let envelope = r#"{"exportedAt": "2024-02-01T00:00:00Z", "assessments": [
            {"id": 2, "timestamp": "2024-01-02T00:00:00Z", "emotion": "medo", "level": 4},
            {"timestamp": "2024-01-03T00:00:00Z", "emotion": "raiva", "level": 2}
        ]}"#;
        let outcome = j.import(envelope).await.unwrap();
        assert_eq!(
            outcome,
            ImportOutcome {
                added: 1,
                skipped: 1,
                invalid: 0
            }
        );

        let records = j.assessments().await.unwrap();
        let emotions: Vec<&str> = records.iter().map(|a| a.emotion.as_str()).collect();
        assert_eq!(emotions, vec!["alegria", "medo", "raiva"]);
    }

    #[tokio::test]
    async fn test_import_dedupes_by_timestamp_without_id() {
        let j = journal();
        let data = r#"[
            {"timestamp": "2024-01-01T00:00:00Z", "emotion": "alegria", "level": 6},
            {"timestamp": "2024-01-01T00:00:00Z", "emotion": "alegria", "level": 6}
        ]"#;
        let outcome = j.import(data).await.unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn test_import_filters_invalid_entries() {
        let j = journal();
        let data = r#"[
            {"timestamp": "2024-01-01T00:00:00Z", "emotion": "alegria", "level": "high"},
            {"emotion": "medo", "level": 3},
            {"timestamp": "2024-01-01T00:00:00Z", "emotion": "", "level": 3},
            {"timestamp": "2024-01-05T00:00:00Z", "emotion": "nojo", "level": 3}
        ]"#;
        let outcome = j.import(data).await.unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.invalid, 3);
    }

    #[tokio::test]
    async fn test_import_drops_out_of_scale_levels() {
        let j = journal();
        let data = r#"[
            {"id": 5, "timestamp": "2024-01-01T00:00:00Z", "emotion": "medo", "level": 200},
            {"id": 6, "timestamp": "2024-01-02T00:00:00Z", "emotion": "medo", "level": 0},
            {"id": 7, "timestamp": "2024-01-03T00:00:00Z", "emotion": "medo", "level": 7}
        ]"#;
        let outcome = j.import(data).await.unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.invalid, 2);
        let records = j.assessments().await.unwrap();
        assert!(records.iter().all(|a| is_valid_level(a.level)));
    }

    #[tokio::test]
    async fn test_import_rejects_out_of_range_ids() {
        let j = journal();
        let data = r#"[
            {"id": 9223372036854775807, "timestamp": "2024-01-01T00:00:00Z", "emotion": "alegria", "level": 4},
            {"id": -3, "timestamp": "2024-01-02T00:00:00Z", "emotion": "alegria", "level": 4},
            {"id": 253402300799999, "timestamp": "2024-01-03T00:00:00Z", "emotion": "alegria", "level": 4}
        ]"#;
        let outcome = j.import(data).await.unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.invalid, 2);

        // Saving after the largest accepted id still yields a fresh, larger id
        let saved = j.save(NewAssessment::new("alegria", 4)).await.unwrap();
        assert_eq!(saved.id, Some(MAX_RECORD_ID + 1));
    }

    #[tokio::test]
    async fn test_save_reports_exhausted_ids() {
        let store = MemoryStore::new();
        store
            .set(
                ASSESSMENTS_KEY,
                r#"[{"id": 9223372036854775807, "timestamp": "2024-01-01T00:00:00Z", "emotion": "alegria", "level": 4}]"#,
            )
            .await
            .unwrap();
        let j = Journal::new(store);
        let err = j.save(NewAssessment::new("alegria", 4)).await.unwrap_err();
        assert!(err.to_string().contains("exhausted"));
        assert_eq!(j.assessments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_errors() {
        let j = journal();
        assert!(matches!(j.import("not json").await, Err(ImportError::InvalidJson(_))));
        assert!(matches!(j.import(r#"{"foo": 1}"#).await, Err(ImportError::NotAnArray)));
        assert!(matches!(j.import("42").await, Err(ImportError::NotAnArray)));
        assert!(matches!(j.import("[]").await, Err(ImportError::NoValidRecords)));
        assert!(matches!(
            j.import(r#"[{"emotion": "x"}]"#).await,
            Err(ImportError::NoValidRecords)
        ));
    }

    #[tokio::test]
    async fn test_export_roundtrips_through_import() {
        let source = journal();
        let ctx = ContextData {
            location: "Casa".into(),
            notes: "dia longo".into(),
            ..ContextData::default()
        };
        source
            .save(NewAssessment::new("tristeza", 4).with_context(ctx))
            .await
            .unwrap();
        let exported = source.export().await.unwrap();

        let target = journal();
        assert_eq!(target.import(&exported).await.unwrap().added, 1);
        assert_eq!(
            target.assessments().await.unwrap(),
            source.assessments().await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_anonymized_export_strips_identity() {
        let j = journal();
        let ctx = ContextData {
            trigger: "discussão com chefe".into(),
            notes: "privado".into(),
            location: "Trabalho".into(),
            ..ContextData::default()
        };
        j.save(NewAssessment::new("raiva", 5).with_context(ctx))
            .await
            .unwrap();

        let raw = j.export_anonymized().await.unwrap();
        let envelope: ExportEnvelope = serde_json::from_str(&raw).unwrap();
        let a = &envelope.assessments[0];
        assert!(a.id.is_none());
        assert!(a.pseudo_id.as_deref().unwrap().starts_with("anon-"));
        assert!(a.context.notes.is_empty());
        assert!(a.context.trigger.is_empty());
        assert_eq!(a.context.location, "Trabalho");

        // Stored journal untouched
        let stored = j.assessments().await.unwrap();
        assert!(stored[0].id.is_some());
        assert_eq!(stored[0].context.notes, "privado");
    }

    #[tokio::test]
    async fn test_corrupt_blobs_read_as_defaults() {
        let store = MemoryStore::new();
        store.set(ASSESSMENTS_KEY, "{broken").await.unwrap();
        store.set(THEME_KEY, "purple").await.unwrap();
        store.set(SAFETY_PLAN_KEY, "[]").await.unwrap();
        let j = Journal::new(store);
        assert!(j.assessments().await.unwrap().is_empty());
        assert_eq!(j.theme().await.unwrap(), Theme::Dark);
        assert_eq!(j.safety_plan().await.unwrap(), SafetyPlan::default());
    }

    #[tokio::test]
    async fn test_non_object_safety_plans_read_as_default() {
        for raw in ["[]", r#"["Ana", "188"]"#, "42", "null", r#""plan""#] {
            let store = MemoryStore::new();
            store.set(SAFETY_PLAN_KEY, raw).await.unwrap();
            let j = Journal::new(store);
            assert_eq!(j.safety_plan().await.unwrap(), SafetyPlan::default(), "{}", raw);
        }
    }

    #[tokio::test]
    async fn test_safety_plan_roundtrip() {
        let j = journal();
        let plan = SafetyPlan {
            contacts: vec![emotrace_core::SafetyContact {
                name: "Ana".into(),
                phone: "188".into(),
                relation: "CVV".into(),
            }],
            coping_phrase: "Respira.".into(),
            safe_place: "Praia".into(),
        };
        j.set_safety_plan(&plan).await.unwrap();
        assert_eq!(j.safety_plan().await.unwrap(), plan);
        assert!(j
            .store()
            .get(SAFETY_PLAN_KEY)
            .await
            .unwrap()
            .unwrap()
            .contains("copingPhantom"));
    }
}
