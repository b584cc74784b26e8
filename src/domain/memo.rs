//! Voice memos captured by the user.
//!
//! A memo is identified by the content hash of its audio, so re-ingesting the
//! same recording finds the existing record and its transcript.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded voice memo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceMemo {
    /// Content hash of the audio (12 hex chars)
    pub id: String,

    pub title: String,

    pub audio_path: PathBuf,

    /// Transcript, once speech-to-text has run
    pub transcription: Option<String>,

    pub duration_seconds: f64,

    pub created_at: DateTime<Utc>,

    /// Tasks accepted from this memo
    #[serde(default)]
    pub task_ids: Vec<Uuid>,
}

impl VoiceMemo {
    /// Create an untranscribed memo
    pub fn new(id: String, audio_path: PathBuf) -> Self {
        let title = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| id.clone());

        Self {
            id,
            title,
            audio_path,
            transcription: None,
            duration_seconds: 0.0,
            created_at: Utc::now(),
            task_ids: Vec::new(),
        }
    }

    pub fn is_transcribed(&self) -> bool {
        self.transcription.is_some()
    }

    /// Duration as m:ss
    pub fn formatted_duration(&self) -> String {
        let total = self.duration_seconds.max(0.0) as u64;
        format!("{}:{:02}", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_title_from_file_stem() {
        let memo = VoiceMemo::new("abc123def456".to_string(), PathBuf::from("/tmp/groceries.m4a"));
        assert_eq!(memo.title, "groceries");
        assert!(!memo.is_transcribed());
    }

    #[test]
    fn test_formatted_duration() {
        let mut memo = VoiceMemo::new("abc".to_string(), PathBuf::from("a.m4a"));
        memo.duration_seconds = 125.7;
        assert_eq!(memo.formatted_duration(), "2:05");
    }
}
