//! Command-line interface for tasktrack.
//!
//! Provides commands for extracting tasks from transcripts and voice memos,
//! managing the task list, and controlling notification preferences.

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::TaskTracker;
use crate::domain::{CandidateTask, Priority, Task};
use crate::extract::ExtractionSource;
use crate::notify::{JournalNotificationCenter, NotificationService};
use crate::store::{JsonPreferencesStore, MemoStore, TaskStore};

pub mod prefs;

/// tasktrack - Turn voice memos into tasks with reminders
#[derive(Parser, Debug)]
#[command(name = "tasktrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract candidate tasks from a transcript
    Extract {
        /// Transcript file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Accept every candidate without prompting
        #[arg(short, long)]
        yes: bool,

        /// Only print candidates, never save
        #[arg(long)]
        dry_run: bool,
    },

    /// Transcribe a voice memo and review the tasks found in it
    Memo {
        /// Audio file
        audio: PathBuf,

        /// Accept every candidate without prompting
        #[arg(short, long)]
        yes: bool,

        /// Whisper binary (or use WHISPER_PATH env)
        #[arg(long, env = "WHISPER_PATH")]
        whisper: Option<PathBuf>,

        /// Whisper model (overrides config)
        #[arg(long)]
        model: Option<String>,
    },

    /// Add a task by hand
    Add {
        /// Task title
        title: String,

        /// Priority: low, medium, high
        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        /// Due-date phrase ("tomorrow", "friday", "next week", ...)
        #[arg(short, long)]
        due: Option<String>,
    },

    /// List tasks
    List {
        /// Include completed tasks
        #[arg(short, long)]
        all: bool,
    },

    /// Mark a task complete
    Complete {
        /// Task ID (or unique prefix)
        id: String,
    },

    /// Delete a task
    Remove {
        /// Task ID (or unique prefix)
        id: String,
    },

    /// Show or change notification preferences
    Prefs {
        #[command(subcommand)]
        command: prefs::PrefsCommands,
    },

    /// Cancel and recreate every notification
    Reschedule,

    /// List pending notifications
    Pending,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Extract { input, yes, dry_run } => extract(input, yes, dry_run).await,
            Commands::Memo {
                audio,
                yes,
                whisper,
                model,
            } => memo(audio, yes, whisper, model).await,
            Commands::Add { title, priority, due } => add_task(&title, priority, due).await,
            Commands::List { all } => list_tasks(all).await,
            Commands::Complete { id } => complete_task(&id).await,
            Commands::Remove { id } => remove_task(&id).await,
            Commands::Prefs { command } => prefs::execute(command).await,
            Commands::Reschedule => reschedule().await,
            Commands::Pending => list_pending().await,
            Commands::Config => show_config().await,
        }
    }
}

/// Notification center backed by the configured journal
fn notification_center(cfg: &ResolvedConfig) -> Arc<JournalNotificationCenter> {
    Arc::new(JournalNotificationCenter::new(cfg.notifications_path()))
}

/// Build a tracker from the resolved configuration
pub(crate) fn build_tracker(cfg: &ResolvedConfig) -> Result<TaskTracker> {
    let tracker = TaskTracker::new(
        TaskStore::new(cfg.tasks_path()),
        MemoStore::new(cfg.memos_path()),
        Arc::new(JsonPreferencesStore::new(cfg.preferences_path())),
        notification_center(cfg),
    )
    .with_extractor(cfg.extractor()?)
    .with_resolver(cfg.resolver)
    .with_scheduler(cfg.scheduler);

    Ok(tracker)
}

/// Extract tasks from a transcript file or stdin
async fn extract(input: Option<PathBuf>, yes: bool, dry_run: bool) -> Result<()> {
    let transcript = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read transcript: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No transcript provided. Use --input <file> or pipe to stdin");
    };

    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let outcome = tracker.extract(&transcript).await;

    if outcome.tasks.is_empty() {
        println!("No tasks found");
        return Ok(());
    }

    print_candidates(&outcome.tasks, outcome.source);
    if dry_run {
        return Ok(());
    }

    let reviewed = review(outcome.tasks, yes)?;
    let accepted = tracker.accept(&reviewed, None).await?;
    print_accepted(&accepted);
    Ok(())
}

/// Transcribe a memo, extract and review
async fn memo(audio: PathBuf, yes: bool, whisper: Option<PathBuf>, model: Option<String>) -> Result<()> {
    if !audio.exists() {
        anyhow::bail!("Audio file not found: {}", audio.display());
    }

    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let whisper = whisper.unwrap_or_else(|| cfg.whisper_path.clone());
    let model = model.unwrap_or_else(|| cfg.whisper_model.clone());

    println!("🎙️  Transcribing: {}", audio.display());
    let ingest = tracker.ingest_memo(&audio, &whisper, &model).await?;
    let memo = &ingest.memo;

    println!();
    println!("Memo:      {} ({})", memo.title, memo.id);
    println!("Duration:  {}", memo.formatted_duration());
    if ingest.reused_transcript {
        println!("Transcript reused from an earlier run");
    }
    println!();
    println!("{}", memo.transcription.as_deref().unwrap_or_default());
    println!();

    if ingest.outcome.tasks.is_empty() {
        println!("No tasks found");
        return Ok(());
    }

    print_candidates(&ingest.outcome.tasks, ingest.outcome.source);
    let reviewed = review(ingest.outcome.tasks, yes)?;
    let accepted = tracker.accept(&reviewed, Some(memo.id.as_str())).await?;
    print_accepted(&accepted);
    Ok(())
}

/// Ask about each candidate on stdin, unless `yes` keeps them all.
///
/// `n` drops a candidate, `e` edits its title and priority, anything else keeps it.
fn review(mut candidates: Vec<CandidateTask>, yes: bool) -> Result<Vec<CandidateTask>> {
    if yes {
        return Ok(candidates);
    }
    if !io::stdin().is_terminal() {
        println!("ℹ️  Not a terminal; pass --yes to save these tasks");
        return Ok(Vec::new());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut ask = |prompt: &str| -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;
        Ok(lines.next().transpose()?.unwrap_or_default().trim().to_string())
    };

    for candidate in candidates.iter_mut() {
        let answer = ask(&format!("Keep \"{}\"? [Y/n/e] ", candidate.title))?.to_lowercase();
        match answer.as_str() {
            "n" | "no" => candidate.toggle(),
            "e" | "edit" => {
                let title = ask("  Title (blank keeps): ")?;
                if !title.is_empty() {
                    candidate.set_title(title);
                }
                let priority = ask(&format!("  Priority [{}]: ", candidate.priority.as_str()))?;
                if !priority.is_empty() {
                    match priority.parse::<Priority>() {
                        Ok(p) => candidate.set_priority(p),
                        Err(e) => println!("  {}; keeping {}", e, candidate.priority),
                    }
                }
            }
            _ => {}
        }
    }
    Ok(candidates)
}

fn print_candidates(candidates: &[CandidateTask], source: ExtractionSource) {
    let via = match source {
        ExtractionSource::Primary => "model",
        ExtractionSource::Fallback => "heuristic",
    };
    println!("Found {} task(s) ({}):", candidates.len(), via);
    println!("{:<4} {:<40} {:<8} {:<20}", "#", "TITLE", "PRIORITY", "DUE");
    println!("{}", "-".repeat(75));
    for (i, c) in candidates.iter().enumerate() {
        println!(
            "{:<4} {:<40} {:<8} {:<20}",
            i + 1,
            truncate(&c.title, 40),
            c.priority,
            c.due_date_phrase.as_deref().unwrap_or("-")
        );
    }
    println!();
}

fn print_accepted(accepted: &[Task]) {
    if accepted.is_empty() {
        println!("ℹ️  No tasks saved");
    } else {
        println!("✅ Saved {} task(s)", accepted.len());
    }
}

/// Add a single task
async fn add_task(title: &str, priority: Priority, due: Option<String>) -> Result<()> {
    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let task = tracker.add_task(title, priority, due.as_deref()).await?;

    println!("✅ Added {} ({})", task.title, short_id(&task));
    if let Some(due) = task.due_date {
        println!("   Due: {}", format_due(due));
    }
    Ok(())
}

/// List tasks, open first
async fn list_tasks(all: bool) -> Result<()> {
    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let list = tracker.task_list().await?;

    let open = list.incomplete();
    let done = if all { list.completed() } else { Vec::new() };

    if open.is_empty() && done.is_empty() {
        println!("No tasks found");
        return Ok(());
    }

    println!("{:<10} {:<40} {:<8} {:<20}", "ID", "TITLE", "PRIORITY", "DUE");
    println!("{}", "-".repeat(80));
    for task in open.iter().chain(done.iter()) {
        let title = if task.completed {
            format!("✓ {}", task.title)
        } else {
            task.title.clone()
        };
        println!(
            "{:<10} {:<40} {:<8} {:<20}",
            short_id(task),
            truncate(&title, 40),
            task.priority,
            task.due_date.map(format_due).unwrap_or_else(|| "-".to_string())
        );
    }

    Ok(())
}

async fn complete_task(id: &str) -> Result<()> {
    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let task = tracker.complete(id).await?;
    println!("✅ Completed {}", task.title);
    Ok(())
}

async fn remove_task(id: &str) -> Result<()> {
    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let task = tracker.remove(id).await?;
    println!("🗑️  Removed {}", task.title);
    Ok(())
}

async fn reschedule() -> Result<()> {
    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let report = tracker.refresh().await?;

    println!("Rescheduled notifications:");
    println!("  Cancelled identifiers: {}", report.cancelled);
    println!("  Created:               {}", report.created);
    if report.failed > 0 {
        println!("  Failed:                {}", report.failed);
    }
    Ok(())
}

async fn list_pending() -> Result<()> {
    let cfg = config::config()?;
    let center = notification_center(cfg);
    let pending = center.pending().await?;

    if pending.is_empty() {
        println!("No pending notifications");
        return Ok(());
    }

    println!("{:<18} {:<40} {:<20}", "FIRES AT", "IDENTIFIER", "TITLE");
    println!("{}", "-".repeat(80));
    for request in pending {
        println!(
            "{:<18} {:<40} {:<20}",
            request.fire_at.to_string(),
            truncate(&request.identifier, 40),
            request.title
        );
    }
    Ok(())
}

async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("  tasktrack Configuration");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:          {}", cfg.home.display());
    println!("  Tasks:         {}", cfg.tasks_path().display());
    println!("  Memos:         {}", cfg.memos_path().display());
    println!("  Preferences:   {}", cfg.preferences_path().display());
    println!("  Notifications: {}", cfg.notifications_path().display());
    println!();
    println!("Extraction:");
    println!("  Generator: {:?}", cfg.extraction.generator);
    println!("  Timeout:   {}s", cfg.extraction.timeout_seconds);
    if let Some(generator) = cfg.generator()? {
        match generator.health_check().await {
            Ok(()) => println!("  ✓ {} reachable", generator.name()),
            Err(e) => println!("  ⚠️  {} unreachable ({:#}); heuristic fallback will be used", generator.name(), e),
        }
    }
    println!();
    println!("Notifications:");
    println!("  Digest lookahead: {} days", cfg.scheduler.lookahead_days());
    println!();
    println!("Due dates:");
    println!("  Evening:     {}", cfg.resolver.evening_time.format("%H:%M"));
    println!("  End of day:  {}", cfg.resolver.end_of_day_time.format("%H:%M"));
    println!();
    println!("Transcription:");
    println!("  Whisper: {}", cfg.whisper_path.display());
    println!("  Model:   {}", cfg.whisper_model);

    Ok(())
}

fn short_id(task: &Task) -> String {
    task.id.to_string()[..8].to_string()
}

fn format_due(due: chrono::NaiveDateTime) -> String {
    due.format("%a %b %-d %H:%M").to_string()
}

/// Truncate to `max` chars, on a char boundary
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
