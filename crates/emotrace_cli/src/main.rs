use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use emotrace_core::{
    ContextData, EmotraceConfig, NewAssessment, ReferenceData, SafetyContact, Theme,
};
use emotrace_limbic::{format_axis_tick, format_elapsed, DecayEngine};
use emotrace_memory::{
    context_stats, daily_dominant, emotion_counts, weekly_consistency, ClinicalReport,
    HistoryFilter, ImportError, Journal, SqliteStore, DEFAULT_REPORT_DAYS,
};
use emotrace_reasoning::InsightService;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "emotrace", author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "emotrace.toml", env = "EMOTRACE_CONFIG")]
    config: String,

    /// Journal database, overriding the config file
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the known emotions and their neurochemistry
    Emotions,

    /// Show the intensity scale for one emotion
    Scale { emotion: String },

    /// Clinical notes for one emotion at one intensity
    Insight { emotion: String, level: u8 },

    /// Hormone glossary plus the body sensation and thinking-trap catalogs
    Glossary,

    /// Simulate hormone decay for an emotion at an intensity
    Simulate {
        emotion: String,
        /// Intensity, 1-7
        #[arg(short, long, default_value_t = 4)]
        level: u8,
        /// Model ruminative thinking
        #[arg(short, long)]
        ruminating: bool,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an emotional assessment
    Log {
        emotion: String,
        level: u8,
        #[arg(long, default_value = "")]
        location: String,
        /// Who you were with (repeatable)
        #[arg(long = "with")]
        company: Vec<String>,
        #[arg(long, default_value = "")]
        trigger: String,
        #[arg(long, default_value_t = 7.0)]
        sleep: f32,
        #[arg(long, default_value_t = 5.0)]
        energy: f32,
        /// Coping strategy used (repeatable)
        #[arg(long = "strategy")]
        coping_strategies: Vec<String>,
        /// Body sensation noticed (repeatable)
        #[arg(long = "body")]
        body_sensations: Vec<String>,
        /// Thinking trap id, see `glossary` (repeatable)
        #[arg(long = "trap")]
        thinking_traps: Vec<String>,
        #[arg(long, default_value = "")]
        notes: String,
        /// Backdate the event (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// List stored assessments
    History {
        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        emotion: Option<String>,
        /// Only the last N days
        #[arg(long, conflicts_with_all = ["from", "to"])]
        days: Option<u32>,
        #[arg(long)]
        json: bool,
    },

    /// Aggregate statistics over the journal
    Stats {
        /// Only the last N days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Delete one assessment by id
    Delete { id: i64 },

    /// Delete every assessment
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Merge a JSON backup into the journal
    Import { file: String },

    /// Write a JSON backup
    Export {
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<String>,
        /// Strip ids, notes and triggers
        #[arg(long)]
        anonymize: bool,
    },

    /// Show or set the theme preference
    Theme { theme: Option<Theme> },

    /// Show or edit the safety plan
    SafetyPlan {
        #[command(subcommand)]
        action: Option<SafetyPlanAction>,
    },

    /// Ask the AI service for a narrative analysis of recent records
    Analyze,

    /// Printable clinical report (Markdown) for a period
    Report {
        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Only the last N days; the default period when no dates are given
        #[arg(long, conflicts_with_all = ["from", "to"])]
        days: Option<u32>,
        #[arg(long)]
        emotion: Option<String>,
        /// Include an AI analysis section
        #[arg(long)]
        analyze: bool,
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SafetyPlanAction {
    Show,
    AddContact {
        name: String,
        phone: String,
        #[arg(default_value = "")]
        relation: String,
    },
    RemoveContact {
        name: String,
    },
    Phrase {
        text: String,
    },
    Place {
        text: String,
    },
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = EmotraceConfig::load_or_default(&cli.config);
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }
    let reference = ReferenceData::builtin().context("Failed to load reference data")?;

    match cli.command {
        Command::Emotions => render::emotions(reference),
        Command::Scale { emotion } => {
            let scale = reference
                .scale(&emotion)
                .with_context(|| format!("Unknown emotion '{}'", emotion))?;
            render::scale(scale);
        }
        Command::Insight { emotion, level } => {
            let scale = reference
                .scale(&emotion)
                .with_context(|| format!("Unknown emotion '{}'", emotion))?;
            let insight = reference
                .insight(&emotion, level)
                .with_context(|| format!("No notes for {} level {}", emotion, level))?;
            render::insight(scale, insight);
        }
        Command::Glossary => render::glossary(reference.clinical()),
        Command::Simulate {
            emotion,
            level,
            ruminating,
            json,
        } => {
            let profile = reference.require_profile(&emotion)?;
            let engine = DecayEngine::from_config(&config.simulation);
            let result = engine.simulate(profile, level, ruminating)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} level {}{}: horizon {}, sampled every {}m",
                    reference.display_name(&emotion),
                    level,
                    if ruminating { " (ruminating)" } else { "" },
                    format_elapsed(result.total_duration_minutes),
                    result.sample_step_minutes
                );
                println!("Recovery estimate: {}", profile.recovery_estimate);
                let ticks: Vec<String> = result
                    .axis_ticks
                    .iter()
                    .map(|t| format_axis_tick(*t))
                    .collect();
                println!("Axis: {}", ticks.join("  "));
                render::series(&emotion, profile, &result, reference);
            }
        }
        Command::Log {
            emotion,
            level,
            location,
            company,
            trigger,
            sleep,
            energy,
            coping_strategies,
            body_sensations,
            thinking_traps,
            notes,
            at,
        } => {
            if reference.scale(&emotion).is_none() {
                tracing::warn!("'{}' is not a known emotion key", emotion);
            }
            for trap in &thinking_traps {
                if reference.clinical().thinking_trap(trap).is_none() {
                    tracing::warn!("'{}' is not a known thinking trap id", trap);
                }
            }
            let context = ContextData {
                location,
                company,
                trigger,
                sleep_hours: sleep,
                energy,
                coping_strategies,
                body_sensations,
                thinking_traps,
                notes,
                ..ContextData::default()
            };
            let mut new = NewAssessment::new(emotion, level).with_context(context);
            if let Some(at) = at {
                new = new.at(at);
            }
            let journal = open_journal(&config).await?;
            let saved = journal.save(new).await?;
            println!("Saved assessment {}", saved.id.unwrap_or_default());
        }
        Command::History {
            from,
            to,
            emotion,
            days,
            json,
        } => {
            let filter = match days {
                Some(days) => HistoryFilter::last_days(Utc::now().date_naive(), days),
                None => HistoryFilter {
                    from,
                    to,
                    emotion: None,
                },
            };
            let filter = HistoryFilter { emotion, ..filter };
            let journal = open_journal(&config).await?;
            let records = journal.assessments().await?;
            let selected = filter.apply(&records);
            if json {
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                render::history(&selected, reference);
            }
        }
        Command::Stats { days } => {
            let today = Utc::now().date_naive();
            let filter = days
                .map(|d| HistoryFilter::last_days(today, d))
                .unwrap_or_default();
            let journal = open_journal(&config).await?;
            let records = journal.assessments().await?;
            let selected = filter.apply(&records);
            render::stats(
                &emotion_counts(selected.iter().copied()),
                &context_stats(selected.iter().copied()),
                &weekly_consistency(selected.iter().copied(), today),
                &daily_dominant(selected.iter().copied()),
                reference,
            );
        }
        Command::Delete { id } => {
            let journal = open_journal(&config).await?;
            if journal.delete(id).await? {
                println!("Deleted assessment {}", id);
            } else {
                anyhow::bail!("No assessment with id {}", id);
            }
        }
        Command::Clear { yes } => {
            anyhow::ensure!(yes, "Refusing to clear the journal without --yes");
            let journal = open_journal(&config).await?;
            let removed = journal.clear().await?;
            println!("Removed {} assessments", removed);
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read backup {}", file))?;
            let journal = open_journal(&config).await?;
            match journal.import(&raw).await {
                Ok(outcome) => println!(
                    "Imported {} assessments ({} already present, {} invalid)",
                    outcome.added, outcome.skipped, outcome.invalid
                ),
                Err(ImportError::Storage(e)) => return Err(e),
                Err(e) => anyhow::bail!("Import failed: {}", e),
            }
        }
        Command::Export { output, anonymize } => {
            let journal = open_journal(&config).await?;
            let payload = if anonymize {
                journal.export_anonymized().await?
            } else {
                journal.export().await?
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, payload)
                        .with_context(|| format!("Failed to write {}", path))?;
                    println!("Exported to {}", path);
                }
                None => println!("{}", payload),
            }
        }
        Command::Theme { theme } => {
            let journal = open_journal(&config).await?;
            if let Some(theme) = theme {
                journal.set_theme(theme).await?;
            }
            println!("{}", journal.theme().await?);
        }
        Command::SafetyPlan { action } => {
            let journal = open_journal(&config).await?;
            let mut plan = journal.safety_plan().await?;
            let changed = match action.unwrap_or(SafetyPlanAction::Show) {
                SafetyPlanAction::Show => false,
                SafetyPlanAction::AddContact {
                    name,
                    phone,
                    relation,
                } => {
                    plan.contacts.push(SafetyContact {
                        name,
                        phone,
                        relation,
                    });
                    true
                }
                SafetyPlanAction::RemoveContact { name } => {
                    let before = plan.contacts.len();
                    plan.contacts.retain(|c| c.name != name);
                    anyhow::ensure!(plan.contacts.len() < before, "No contact named '{}'", name);
                    true
                }
                SafetyPlanAction::Phrase { text } => {
                    plan.coping_phrase = text;
                    true
                }
                SafetyPlanAction::Place { text } => {
                    plan.safe_place = text;
                    true
                }
                SafetyPlanAction::Reset => {
                    plan = Default::default();
                    true
                }
            };
            if changed {
                journal.set_safety_plan(&plan).await?;
            }
            render::safety_plan(&plan);
        }
        Command::Analyze => {
            let journal = open_journal(&config).await?;
            let records = journal.assessments().await?;
            let service = InsightService::from_config(&config.ai)?;
            let result = service
                .analyze(&records)
                .await
                .context("Analysis unavailable, try again later")?;
            render::analysis(&result);
        }
        Command::Report {
            from,
            to,
            days,
            emotion,
            analyze,
            output,
        } => {
            let today = Utc::now().date_naive();
            let filter = match (from, to, days) {
                (None, None, days) => {
                    HistoryFilter::last_days(today, days.unwrap_or(DEFAULT_REPORT_DAYS))
                }
                (from, to, _) => HistoryFilter {
                    from,
                    to,
                    emotion: None,
                },
            };
            let filter = HistoryFilter { emotion, ..filter };
            let journal = open_journal(&config).await?;
            let records = journal.assessments().await?;
            let mut report = ClinicalReport::build(&records, &filter, Utc::now());

            if analyze {
                let in_scope: Vec<_> = filter.apply(&records).into_iter().cloned().collect();
                let analysis = match InsightService::from_config(&config.ai) {
                    Ok(service) => service.analyze(&in_scope).await.map_err(anyhow::Error::from),
                    Err(e) => Err(e),
                };
                match analysis {
                    Ok(result) => report = report.with_analysis(result),
                    Err(e) => tracing::warn!("Report written without AI analysis: {:#}", e),
                }
            }

            let markdown = report.to_markdown(reference);
            match output {
                Some(path) => {
                    std::fs::write(&path, markdown)
                        .with_context(|| format!("Failed to write {}", path))?;
                    println!("Report written to {}", path);
                }
                None => print!("{}", markdown),
            }
        }
    }

    Ok(())
}

async fn open_journal(config: &EmotraceConfig) -> Result<Journal<SqliteStore>> {
    info!("Opening journal at {}", config.storage.db_path);
    let store = SqliteStore::new(&config.storage.db_path).await?;
    Ok(Journal::new(store))
}
