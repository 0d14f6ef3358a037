//! Plain-text output for the terminal.

use emotrace_core::{
    AnalysisResult, Assessment, ClinicalNotes, EmotionNeuroProfile, EmotionScale, LevelInsight,
    ReferenceData, SafetyPlan,
};
use emotrace_limbic::{format_axis_tick, SimulationResult};
use emotrace_memory::{ContextStats, DayCell, DayCount, EmotionCount};

/// Rows printed for a simulated series; longer series are thinned.
const MAX_SERIES_ROWS: usize = 40;

pub fn emotions(reference: &ReferenceData) {
    for key in reference.emotion_keys() {
        let name = reference.display_name(key);
        match reference.neuro_profile(key) {
            Some(profile) => {
                println!("{} ({})", name, key);
                println!("  {}", profile.description);
                println!("  Recovery: {}", profile.recovery_estimate);
                for h in &profile.hormones {
                    println!(
                        "  - {:<14} peak {:>3}m, decay {:.1}  {}",
                        h.name, h.decay_profile.peak_time, h.decay_profile.decay_rate, h.description
                    );
                }
            }
            None => println!("{} ({})", name, key),
        }
    }
}

pub fn scale(scale: &EmotionScale) {
    println!("{} (1-{})", scale.name, scale.max_level());
    for level in &scale.levels {
        println!("{}. {}: {}", level.level, level.label, level.description);
        if !level.examples.is_empty() {
            println!("   e.g. {}", level.examples);
        }
        if !level.regulation.is_empty() {
            println!("   regulation: {}", level.regulation);
        }
    }
}

pub fn insight(scale: &EmotionScale, insight: &LevelInsight) {
    match scale.level(insight.level) {
        Some(level) => println!("{} {}: {}", scale.name, insight.level, level.label),
        None => println!("{} {}", scale.name, insight.level),
    }
    println!("\nExample:\n  {}", insight.example);
    println!("\nNeurochemistry:\n  {}", insight.science);
    println!("\nBody:\n  {}", insight.body_changes);
}

pub fn glossary(clinical: &ClinicalNotes) {
    println!("Hormones:");
    for entry in clinical.glossary() {
        println!("  {:<14} {:<24} {}", entry.name, entry.function, entry.color);
    }
    println!("Body sensations:");
    for sensation in clinical.body_sensations() {
        println!("  - {}", sensation);
    }
    println!("Thinking traps:");
    for trap in clinical.thinking_traps() {
        println!("  {:<16} {}: {}", trap.id, trap.label, trap.description);
    }
}

pub fn series(
    emotion: &str,
    profile: &EmotionNeuroProfile,
    result: &SimulationResult,
    reference: &ReferenceData,
) {
    let names: Vec<&str> = profile.hormone_names().collect();

    let header: Vec<String> = names
        .iter()
        .map(|n| match reference.palette().hormone_color(emotion, n) {
            Some(color) => format!("{} {}", n, color),
            None => n.to_string(),
        })
        .collect();
    println!("{:>6}  {}", "time", header.join("  "));

    let stride = result.series.len().div_ceil(MAX_SERIES_ROWS).max(1);
    let last = result.series.len().saturating_sub(1);
    for (i, point) in result.series.iter().enumerate() {
        if i % stride != 0 && i != last {
            continue;
        }
        let cols: Vec<String> = names
            .iter()
            .zip(&header)
            .map(|(n, h)| {
                let v = point.value(n).unwrap_or_default();
                format!("{:>width$.1}", v, width = h.len())
            })
            .collect();
        println!(
            "{:>6}  {}",
            format_axis_tick(point.time_minutes),
            cols.join("  ")
        );
    }

    for n in &names {
        if let Some((t, v)) = result.peak_of(n) {
            println!("{} peaks at {:.1}% ({})", n, v, format_axis_tick(t));
        }
    }
}

pub fn history(records: &[&Assessment], reference: &ReferenceData) {
    if records.is_empty() {
        println!("No assessments.");
        return;
    }
    for r in records {
        let label = reference
            .level(&r.emotion, r.level)
            .map(|l| l.label.as_str())
            .unwrap_or("");
        let mut line = format!(
            "{:>13}  {}  {} {} {}",
            r.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            r.timestamp.format("%Y-%m-%d %H:%M"),
            reference.display_name(&r.emotion),
            r.level,
            label
        );
        if !r.context.location.is_empty() {
            line.push_str(&format!("  @ {}", r.context.location));
        }
        if !r.context.company.is_empty() {
            line.push_str(&format!("  with {}", r.context.company.join(", ")));
        }
        println!("{}", line);
        if !r.context.trigger.is_empty() {
            println!("{:>15}trigger: {}", "", r.context.trigger);
        }
        if !r.context.notes.is_empty() {
            println!("{:>15}{}", "", r.context.notes);
        }
    }
}

pub fn stats(
    counts: &[EmotionCount],
    context: &ContextStats,
    week: &[DayCount],
    calendar: &[DayCell],
    reference: &ReferenceData,
) {
    if counts.is_empty() {
        println!("No assessments.");
        return;
    }

    println!("Emotions:");
    for c in counts {
        println!(
            "  {:<12} {:>3}  avg level {:.1}",
            reference.display_name(&c.emotion),
            c.count,
            c.average_level
        );
    }

    for (title, ranked) in [
        ("Locations", &context.locations),
        ("Company", &context.companions),
        ("Triggers", &context.triggers),
    ] {
        if ranked.is_empty() {
            continue;
        }
        println!("{}:", title);
        for (value, count) in ranked {
            println!("  {:<20} {}", value, count);
        }
    }

    println!("Last 7 days:");
    for d in week {
        println!("  {}  {}", d.date.format("%a %d/%m"), "#".repeat(d.count));
    }

    println!("Calendar:");
    for cell in calendar {
        println!(
            "  {}  {} {} ({} entries)",
            cell.date,
            reference.display_name(&cell.emotion),
            cell.level,
            cell.entries
        );
    }
}

pub fn safety_plan(plan: &SafetyPlan) {
    println!("Coping phrase: {}", plan.coping_phrase);
    println!("Safe place: {}", plan.safe_place);
    if plan.contacts.is_empty() {
        println!("Contacts: none");
    } else {
        println!("Contacts:");
        for c in &plan.contacts {
            println!("  {} ({}) {}", c.name, c.relation, c.phone);
        }
    }
}

pub fn analysis(result: &AnalysisResult) {
    println!("{}", result.summary);
    println!("\nTrend: {:?}", result.mood_trend);
    println!("\nPatterns:");
    for p in &result.patterns {
        println!("  - {}", p);
    }
    println!("\nSuggestions:");
    for s in &result.suggestions {
        println!("  - {}", s);
    }
}
