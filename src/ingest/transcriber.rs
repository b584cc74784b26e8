//! Whisper transcription backend.
//!
//! Speech-to-text is opaque to tasktrack: this shells out to a local
//! whisper binary and returns the transcript string.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Result of transcription
#[derive(Debug, Clone)]
pub struct TranscriptResult {
    pub text: String,
    pub duration_seconds: f64,
}

/// Whisper output JSON structure
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    end: f64,
}

impl WhisperOutput {
    fn into_result(self) -> TranscriptResult {
        let duration = self.segments.last().map(|s| s.end).unwrap_or(0.0);
        TranscriptResult {
            text: self.text.trim().to_string(),
            duration_seconds: duration,
        }
    }
}

/// Transcribe audio using the local Whisper binary
pub async fn transcribe(audio_path: &Path, whisper_path: &Path, model: &str) -> Result<TranscriptResult> {
    let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;

    debug!(audio = %audio_path.display(), model, "Running whisper");

    let output = Command::new(whisper_path)
        .arg(audio_path)
        .arg("--model")
        .arg(model)
        .arg("--output_dir")
        .arg(temp_dir.path())
        .arg("--output_format")
        .arg("json")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("Failed to run whisper at {}", whisper_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Whisper failed: {}", stderr);
    }

    let stem = audio_path.file_stem().unwrap_or_default().to_string_lossy();
    let json_path = temp_dir.path().join(format!("{}.json", stem));

    let json_content = tokio::fs::read_to_string(&json_path)
        .await
        .context("Failed to read whisper output")?;

    let whisper: WhisperOutput =
        serde_json::from_str(&json_content).context("Failed to parse whisper JSON")?;

    Ok(whisper.into_result())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whisper_output_parsing() {
        let whisper: WhisperOutput = serde_json::from_str(
            r#"{"text": "  I need to call mom. ", "language": "fr", "segments": [{"end": 1.5}, {"end": 3.25}]}"#,
        )
        .unwrap();
        let result = whisper.into_result();

        assert_eq!(result.text, "I need to call mom.");
        assert_eq!(result.duration_seconds, 3.25);
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let result = transcribe(
            Path::new("memo.m4a"),
            Path::new("/nonexistent/whisper"),
            "base",
        )
        .await;
        assert!(result.is_err());
    }
}
