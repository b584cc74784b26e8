//! Tasks and extraction candidates.
//!
//! A `CandidateTask` is what extraction produces: unconfirmed, with a raw
//! due-date phrase. A `Task` is what the store persists: confirmed, with a
//! concrete due date (or none).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Priority {
    /// Lenient parse used for model output: anything unrecognised is Medium
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.pad(label)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// A task extracted from a transcript, pending user review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTask {
    pub title: String,

    #[serde(default)]
    pub priority: Priority,

    /// Unresolved due-date hint ("Tomorrow", "Friday", ...)
    pub due_date_phrase: Option<String>,

    /// Whether the task will be kept on acceptance
    #[serde(default = "default_selected")]
    pub selected: bool,
}

fn default_selected() -> bool {
    true
}

impl CandidateTask {
    /// Create a selected candidate
    pub fn new(title: impl Into<String>, priority: Priority, due_date_phrase: Option<String>) -> Self {
        Self {
            title: title.into(),
            priority,
            due_date_phrase,
            selected: true,
        }
    }

    /// Flip the inclusion flag
    pub fn toggle(&mut self) {
        self.selected = !self.selected;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }
}

/// A confirmed, persisted task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,

    pub title: String,

    #[serde(default)]
    pub priority: Priority,

    /// Concrete local due date, never a phrase
    pub due_date: Option<NaiveDateTime>,

    #[serde(default)]
    pub completed: bool,

    pub created_at: DateTime<Utc>,

    /// Voice memo this task was extracted from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_id: Option<String>,
}

impl Task {
    /// Create a new incomplete task with a fresh id
    pub fn new(title: impl Into<String>, priority: Priority, due_date: Option<NaiveDateTime>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            priority,
            due_date,
            completed: false,
            created_at: Utc::now(),
            memo_id: None,
        }
    }

    /// Attach the originating memo
    pub fn with_memo(mut self, memo_id: impl Into<String>) -> Self {
        self.memo_id = Some(memo_id.into());
        self
    }

    /// Identifier used for this task's due-date notification
    pub fn notification_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parsing() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::parse_lenient("urgent"), Priority::Medium);
        assert!(Priority::High > Priority::Low);
    }

    #[test]
    fn test_candidate_defaults_to_selected() {
        let mut candidate = CandidateTask::new("Call mom", Priority::Medium, None);
        assert!(candidate.selected);
        candidate.toggle();
        assert!(!candidate.selected);

        let parsed: CandidateTask =
            serde_json::from_str(r#"{"title":"Buy milk","due_date_phrase":null}"#).unwrap();
        assert!(parsed.selected);
        assert_eq!(parsed.priority, Priority::Medium);
    }

    #[test]
    fn test_task_notification_id_is_uuid_string() {
        let task = Task::new("Pay rent", Priority::High, None);
        assert_eq!(task.notification_id(), task.id.to_string());
    }
}
