//! tasktrack - Voice-memo task tracker
//!
//! Turns spoken notes into a task list with reminders.
//!
//! # Architecture
//!
//! ```text
//! audio → Whisper → transcript → extraction → review → task store
//!                                                        ↓
//!                        preferences → scheduler → notification service
//! ```
//!
//! - Extraction asks a generative text service first and falls back to a
//!   keyword heuristic on any failure
//! - Due-date phrases are resolved once, at review time, against a local clock
//! - Notification planning is pure and idempotent: each pass cancels every
//!   identifier it may have created, then recreates what should exist
//!
//! # Modules
//!
//! - `adapters`: Generative text services (local command, HTTP)
//! - `extract`: Model and heuristic extraction strategies
//! - `schedule`: Clock, due-date resolver, notification scheduler
//! - `notify`: Notification services (JSONL journal, in-memory)
//! - `store`: Task, memo and preference persistence
//! - `ingest`: Whisper transcription
//! - `core`: Review and the tracker service
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Extract tasks from a transcript
//! echo "I need to call mom tomorrow" | tasktrack extract --yes
//!
//! # Transcribe a memo and review its tasks
//! tasktrack memo ~/Recordings/groceries.m4a
//!
//! # Turn on daily digests
//! tasktrack prefs set notificationsEnabled on
//! tasktrack prefs set dailyDigestEnabled on
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod extract;
pub mod ingest;
pub mod notify;
pub mod schedule;
pub mod store;

// Re-export main types at crate root for convenience
pub use crate::core::{accept_candidates, TaskTracker};
pub use domain::{
    CandidateTask, NotificationPlan, NotificationPreferences, NotificationRequest, PreferenceKey, Priority,
    Task, VoiceMemo,
};
pub use extract::{ExtractionError, TaskExtractor};
pub use notify::{JournalNotificationCenter, MemoryNotificationCenter, NotificationService};
pub use schedule::{Clock, DueDatePhraseResolver, FixedClock, NotificationScheduler, SystemClock};
