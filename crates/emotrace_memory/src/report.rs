//! The printable clinical report: period summary, emotion frequency and
//! the full journal log, rendered as Markdown for a clinician.

use crate::history::{context_stats, emotion_counts, ContextStats, EmotionCount, HistoryFilter};
use chrono::{DateTime, NaiveDate, Utc};
use emotrace_core::{AnalysisResult, Assessment, ReferenceData};
use serde::Serialize;
use std::fmt::Write;

/// Default reporting window when no dates are given.
pub const DEFAULT_REPORT_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub emotion: String,
    pub count: usize,
    /// Fraction of the period's records, 0-1.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalReport {
    pub generated_at: DateTime<Utc>,
    /// Reported period; falls back to the span of the records.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total: usize,
    pub dominant: Option<EmotionCount>,
    pub frequency: Vec<FrequencyRow>,
    pub context: ContextStats,
    /// Newest first.
    pub entries: Vec<Assessment>,
    pub analysis: Option<AnalysisResult>,
}

impl ClinicalReport {
    pub fn build(
        records: &[Assessment],
        filter: &HistoryFilter,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let selected = filter.apply(records);
        let total = selected.len();
        let counts = emotion_counts(selected.iter().copied());
        let frequency = counts
            .iter()
            .map(|c| FrequencyRow {
                emotion: c.emotion.clone(),
                count: c.count,
                share: c.count as f64 / total as f64,
            })
            .collect();

        let mut entries: Vec<Assessment> = selected.iter().map(|a| (*a).clone()).collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let first_day = entries.last().map(|a| a.timestamp.date_naive());
        let last_day = entries.first().map(|a| a.timestamp.date_naive());

        Self {
            generated_at,
            from: filter.from.or(first_day),
            to: filter.to.or(last_day),
            total,
            dominant: counts.into_iter().next(),
            frequency,
            context: context_stats(selected.iter().copied()),
            entries,
            analysis: None,
        }
    }

    pub fn with_analysis(mut self, analysis: AnalysisResult) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn to_markdown(&self, reference: &ReferenceData) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_markdown(&mut out, reference);
        out
    }

    fn write_markdown(&self, out: &mut String, reference: &ReferenceData) -> std::fmt::Result {
        writeln!(out, "# Emotional Thermometer: Clinical Report")?;
        writeln!(out)?;
        writeln!(
            out,
            "- **Generated:** {}",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(
            out,
            "- **Period:** {} to {}",
            day_or_dash(self.from),
            day_or_dash(self.to)
        )?;
        writeln!(out, "- **Patient ID:** ____________________")?;
        writeln!(out, "- **Total records:** {}", self.total)?;

        if let Some(analysis) = &self.analysis {
            writeln!(out)?;
            writeln!(out, "## Clinical analysis (AI)")?;
            writeln!(out)?;
            writeln!(out, "{}", analysis.summary)?;
            writeln!(out)?;
            writeln!(out, "### Patterns")?;
            for p in &analysis.patterns {
                writeln!(out, "- {}", p)?;
            }
            writeln!(out)?;
            writeln!(out, "### Suggestions")?;
            for s in &analysis.suggestions {
                writeln!(out, "- {}", s)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "## Statistics")?;
        writeln!(out)?;
        match &self.dominant {
            Some(d) => writeln!(
                out,
                "Predominant emotion: **{}** ({})",
                reference.display_name(&d.emotion),
                d.count
            )?,
            None => writeln!(out, "Predominant emotion: -")?,
        }
        if !self.context.triggers.is_empty() {
            let triggers: Vec<String> = self
                .context
                .triggers
                .iter()
                .map(|(t, c)| format!("{} ({})", t, c))
                .collect();
            writeln!(out, "Frequent triggers: {}", triggers.join(", "))?;
        }

        writeln!(out)?;
        writeln!(out, "## Frequency")?;
        writeln!(out)?;
        writeln!(out, "| Emotion | Count | Share |")?;
        writeln!(out, "|---|---:|---:|")?;
        for row in &self.frequency {
            writeln!(
                out,
                "| {} | {} | {:.0}% |",
                cell(reference.display_name(&row.emotion)),
                row.count,
                row.share * 100.0
            )?;
        }

        writeln!(out)?;
        writeln!(out, "## Journal & clinical log")?;
        writeln!(out)?;
        writeln!(out, "| Date | State | Metrics | Context & notes |")?;
        writeln!(out, "|---|---|---|---|")?;
        for a in &self.entries {
            let mut state = format!("**{}** level {}", reference.display_name(&a.emotion), a.level);
            if let Some(secondary) = a.context.secondary_emotion.as_deref() {
                write!(state, " (+ {})", reference.display_name(secondary))?;
            }
            let metrics = format!(
                "Val {:.1}, Act {:.1}, Sleep {}h",
                a.context.custom_valence, a.context.custom_arousal, a.context.sleep_hours
            );
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                a.timestamp.format("%Y-%m-%d %H:%M"),
                cell(&state),
                metrics,
                cell(&context_line(a))
            )?;
        }
        Ok(())
    }
}

fn day_or_dash(day: Option<NaiveDate>) -> String {
    day.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

fn context_line(a: &Assessment) -> String {
    let ctx = &a.context;
    let mut parts = Vec::new();
    if !ctx.notes.is_empty() {
        parts.push(format!("\"{}\"", ctx.notes));
    }
    if !ctx.trigger.is_empty() {
        parts.push(format!("trigger: {}", ctx.trigger));
    }
    if !ctx.location.is_empty() {
        parts.push(format!("at: {}", ctx.location));
    }
    if !ctx.body_sensations.is_empty() {
        parts.push(format!("body: {}", ctx.body_sensations.join(", ")));
    }
    parts.join("; ")
}

/// Keep free text inside one table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
