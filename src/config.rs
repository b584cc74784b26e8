//! Configuration for tasktrack.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TASKTRACK_HOME, WHISPER_PATH)
//! 2. Config file (.tasktrack/config.yaml)
//! 3. Defaults (~/.tasktrack)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tasktrack/config.yaml
//! - Paths in config file are relative to the .tasktrack/ directory

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;

use crate::adapters::{CommandGenerator, HttpGenerator, TextGenerator};
use crate::extract::{ModelStrategy, TaskExtractor};
use crate::schedule::{DueDatePhraseResolver, NotificationScheduler};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub extraction: Option<ExtractionConfig>,
    #[serde(default)]
    pub notifications: Option<NotificationsConfig>,
    #[serde(default)]
    pub due_dates: Option<DueDatesConfig>,
    #[serde(default)]
    pub transcription: Option<TranscriptionConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .tasktrack/)
    pub home: Option<String>,
}

/// Which generative text service backs the primary extraction strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Heuristic extraction only
    #[default]
    None,
    Command,
    Http,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub generator: GeneratorKind,
    pub command: Option<Vec<String>>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    pub lookahead_days: Option<u32>,
    pub cancel_window_days: Option<u32>,
    pub digest_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DueDatesConfig {
    pub evening_time: Option<String>,
    pub end_of_day_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    pub model: Option<String>,
}

/// Generator settings after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSettings {
    pub generator: GeneratorKind,
    pub command: Vec<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            generator: GeneratorKind::None,
            command: vec!["ollama".to_string(), "run".to_string(), "llama3.2".to_string()],
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.2".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to tasktrack home (state files)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub extraction: ExtractionSettings,
    pub scheduler: NotificationScheduler,
    pub resolver: DueDatePhraseResolver,
    pub whisper_path: PathBuf,
    pub whisper_model: String,
}

impl ResolvedConfig {
    pub fn tasks_path(&self) -> PathBuf {
        self.home.join("tasks.json")
    }

    pub fn memos_path(&self) -> PathBuf {
        self.home.join("memos.json")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.home.join("preferences.json")
    }

    pub fn notifications_path(&self) -> PathBuf {
        self.home.join("notifications.jsonl")
    }

    /// Build the configured generator, if any
    pub fn generator(&self) -> Result<Option<Arc<dyn TextGenerator>>> {
        let settings = &self.extraction;
        let generator: Arc<dyn TextGenerator> = match settings.generator {
            GeneratorKind::None => return Ok(None),
            GeneratorKind::Command => Arc::new(CommandGenerator::from_argv(&settings.command)?),
            GeneratorKind::Http => Arc::new(HttpGenerator::from_env(
                settings.endpoint.clone(),
                settings.model.clone(),
            )),
        };
        Ok(Some(generator))
    }

    /// Extractor with the configured primary strategy
    pub fn extractor(&self) -> Result<TaskExtractor> {
        let timeout = Duration::from_secs(self.extraction.timeout_seconds);
        Ok(match self.generator()? {
            Some(generator) => TaskExtractor::new(Box::new(ModelStrategy::new(generator, timeout)), timeout),
            None => TaskExtractor::heuristic_only(),
        })
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tasktrack").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Parse an `HH:MM` time of day
fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", value))
}

fn optional_time(value: Option<&String>, default: NaiveTime) -> Result<NaiveTime> {
    value.map(|v| parse_time(v)).transpose().map(|t| t.unwrap_or(default))
}

/// Apply a parsed config file on top of defaults
fn resolve_file(config: &ConfigFile, config_dir: &Path, default_home: PathBuf) -> Result<ResolvedConfig> {
    let home = config
        .paths
        .home
        .as_deref()
        .map(|h| resolve_path(config_dir, h))
        .unwrap_or(default_home);

    let mut extraction = ExtractionSettings::default();
    if let Some(ref e) = config.extraction {
        extraction.generator = e.generator;
        if let Some(ref command) = e.command {
            extraction.command = command.clone();
        }
        if let Some(ref endpoint) = e.endpoint {
            extraction.endpoint = endpoint.clone();
        }
        if let Some(ref model) = e.model {
            extraction.model = model.clone();
        }
        if let Some(timeout) = e.timeout_seconds {
            extraction.timeout_seconds = timeout;
        }
    }

    let default_scheduler = NotificationScheduler::default();
    let scheduler = match config.notifications {
        Some(ref n) => {
            let lookahead = n.lookahead_days.unwrap_or(7);
            let window = n.cancel_window_days.unwrap_or(14);
            let digest_time = optional_time(
                n.digest_time.as_ref(),
                NaiveTime::from_hms_opt(5, 0, 0).unwrap_or(NaiveTime::MIN),
            )?;
            NotificationScheduler::new(lookahead, window, digest_time)?
        }
        None => default_scheduler,
    };

    let default_resolver = DueDatePhraseResolver::default();
    let resolver = match config.due_dates {
        Some(ref d) => DueDatePhraseResolver::new(
            optional_time(d.evening_time.as_ref(), default_resolver.evening_time)?,
            optional_time(d.end_of_day_time.as_ref(), default_resolver.end_of_day_time)?,
        ),
        None => default_resolver,
    };

    let whisper_model = config
        .transcription
        .as_ref()
        .and_then(|t| t.model.clone())
        .unwrap_or_else(|| "base".to_string());

    Ok(ResolvedConfig {
        home,
        config_file: None,
        extraction,
        scheduler,
        resolver,
        whisper_path: default_whisper_path(),
        whisper_model,
    })
}

fn default_whisper_path() -> PathBuf {
    PathBuf::from("whisper")
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".tasktrack");

    let config_file = find_config_file();

    let mut resolved = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        let mut resolved = resolve_file(&config, config_dir, default_home)?;
        resolved.config_file = Some(config_path.clone());
        resolved
    } else {
        ResolvedConfig {
            home: default_home,
            config_file: None,
            extraction: ExtractionSettings::default(),
            scheduler: NotificationScheduler::default(),
            resolver: DueDatePhraseResolver::default(),
            whisper_path: default_whisper_path(),
            whisper_model: "base".to_string(),
        }
    };

    if let Ok(env_home) = std::env::var("TASKTRACK_HOME") {
        resolved.home = PathBuf::from(env_home);
    }
    if let Ok(whisper) = std::env::var("WHISPER_PATH") {
        resolved.whisper_path = PathBuf::from(whisper);
    }

    Ok(resolved)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
