//! History analytics over stored assessments: filtering, per-emotion
//! counts, context hot spots, the calendar view and trend series.
//!
//! All functions are pure and take records in any order. Calendar days are
//! UTC dates.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use emotrace_core::Assessment;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// How many entries each context ranking keeps.
pub const TOP_CONTEXT_ENTRIES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Inclusive start date.
    pub from: Option<NaiveDate>,
    /// Inclusive end date.
    pub to: Option<NaiveDate>,
    pub emotion: Option<String>,
}

impl HistoryFilter {
    /// The last `days` calendar days ending at `today`, inclusive.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            from: Some(today - Duration::days(span)),
            to: Some(today),
            emotion: None,
        }
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    pub fn matches(&self, record: &Assessment) -> bool {
        let day = record.timestamp.date_naive();
        self.from.map_or(true, |from| day >= from)
            && self.to.map_or(true, |to| day <= to)
            && self
                .emotion
                .as_deref()
                .map_or(true, |e| record.emotion == e)
    }

    pub fn apply<'a>(&self, records: &'a [Assessment]) -> Vec<&'a Assessment> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionCount {
    pub emotion: String,
    pub count: usize,
    pub average_level: f64,
}

/// Occurrences per emotion, most frequent first, ties by key.
pub fn emotion_counts<'a>(records: impl IntoIterator<Item = &'a Assessment>) -> Vec<EmotionCount> {
    let mut acc: HashMap<&str, (usize, u32)> = HashMap::new();
    for r in records {
        let entry = acc.entry(r.emotion.as_str()).or_default();
        entry.0 += 1;
        entry.1 += u32::from(r.level);
    }
    let mut counts: Vec<EmotionCount> = acc
        .into_iter()
        .map(|(emotion, (count, level_sum))| EmotionCount {
            emotion: emotion.to_string(),
            count,
            average_level: f64::from(level_sum) / count as f64,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.emotion.cmp(&b.emotion)));
    counts
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextStats {
    pub locations: Vec<(String, usize)>,
    pub companions: Vec<(String, usize)>,
    pub triggers: Vec<(String, usize)>,
}

impl ContextStats {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.companions.is_empty() && self.triggers.is_empty()
    }
}

/// Top locations, companions and triggers. Blank values are ignored.
pub fn context_stats<'a>(records: impl IntoIterator<Item = &'a Assessment>) -> ContextStats {
    let mut locations = HashMap::new();
    let mut companions = HashMap::new();
    let mut triggers = HashMap::new();

    for r in records {
        tally(&mut locations, &r.context.location);
        for person in &r.context.company {
            tally(&mut companions, person);
        }
        tally(&mut triggers, &r.context.trigger);
    }

    ContextStats {
        locations: top(locations),
        companions: top(companions),
        triggers: top(triggers),
    }
}

fn tally<'a>(counts: &mut HashMap<&'a str, usize>, value: &'a str) {
    let value = value.trim();
    if !value.is_empty() {
        *counts.entry(value).or_default() += 1;
    }
}

fn top(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_CONTEXT_ENTRIES);
    ranked
}

/// One calendar cell: the strongest emotion logged that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub emotion: String,
    pub level: u8,
    pub entries: usize,
}

/// Per day, the highest-level record. On equal levels the later record
/// wins. Days come out ascending.
pub fn daily_dominant<'a>(records: impl IntoIterator<Item = &'a Assessment>) -> Vec<DayCell> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&Assessment>> = BTreeMap::new();
    for r in records {
        by_day.entry(r.timestamp.date_naive()).or_default().push(r);
    }

    by_day
        .into_iter()
        .filter_map(|(date, mut day)| {
            day.sort_by_key(|r| r.timestamp);
            let entries = day.len();
            day.into_iter()
                .reduce(|best, r| if r.level >= best.level { r } else { best })
                .map(|best| DayCell {
                    date,
                    emotion: best.emotion.clone(),
                    level: best.level,
                    entries,
                })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Entries per day for the seven days ending at `today`, oldest first.
/// Days without entries are included with a zero count.
pub fn weekly_consistency<'a>(
    records: impl IntoIterator<Item = &'a Assessment>,
    today: NaiveDate,
) -> Vec<DayCount> {
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.timestamp.date_naive()).or_default() += 1;
    }
    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            DayCount {
                date,
                count: counts.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub emotion: String,
    pub level: u8,
    pub sleep_hours: f32,
    pub energy: f32,
}

/// Level, sleep and energy over time, ascending.
pub fn trend<'a>(records: impl IntoIterator<Item = &'a Assessment>) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = records
        .into_iter()
        .map(|r| TrendPoint {
            timestamp: r.timestamp,
            emotion: r.emotion.clone(),
            level: r.level,
            sleep_hours: r.context.sleep_hours,
            energy: r.context.energy,
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}
