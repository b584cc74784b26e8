//! Model-backed extraction.
//!
//! Asks a generative text service for a JSON array of tasks and parses the
//! array out of whatever prose surrounds it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::adapters::TextGenerator;
use crate::domain::{CandidateTask, Priority};

use super::{ExtractionError, ExtractionStrategy};

/// One task as the model reports it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelTask {
    title: String,
    priority: String,
    #[serde(default)]
    due_date_description: Option<String>,
}

/// Strategy that delegates to a `TextGenerator`
pub struct ModelStrategy {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl ModelStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }
}

#[async_trait]
impl ExtractionStrategy for ModelStrategy {
    fn name(&self) -> &str {
        "model"
    }

    async fn extract(&self, transcript: &str) -> Result<Vec<CandidateTask>, ExtractionError> {
        let prompt = build_prompt(transcript);
        let output = self
            .generator
            .generate(&prompt, self.timeout)
            .await
            .map_err(|e| ExtractionError::Unavailable(format!("{}: {:#}", self.generator.name(), e)))?;

        debug!(
            generator = self.generator.name(),
            tokens = ?output.tokens_used,
            "Model responded"
        );

        parse_model_response(&output.content)
    }
}

/// Instruction sent to the model
pub fn build_prompt(transcript: &str) -> String {
    format!(
        "Extract actionable tasks from the following voice memo transcription.\n\
         For each task, provide:\n\
         - A clear, concise title\n\
         - Priority level (low, medium, or high)\n\
         - Due date description if mentioned (e.g., \"tomorrow\", \"next week\", \"Friday\")\n\
         \n\
         Transcription:\n\
         {}\n\
         \n\
         Return the tasks as a JSON array with objects containing \"title\", \"priority\", and \"dueDateDescription\" fields.\n\
         Only include actual actionable tasks, not observations or notes.",
        transcript
    )
}

/// Parse the JSON array between the first `[` and the last `]`
pub fn parse_model_response(content: &str) -> Result<Vec<CandidateTask>, ExtractionError> {
    let start = content
        .find('[')
        .ok_or_else(|| ExtractionError::Parse("no JSON array in response".to_string()))?;
    let end = content
        .rfind(']')
        .filter(|end| *end > start)
        .ok_or_else(|| ExtractionError::Parse("unterminated JSON array in response".to_string()))?;

    let tasks: Vec<ModelTask> = serde_json::from_str(&content[start..=end])
        .map_err(|e| ExtractionError::Parse(e.to_string()))?;

    Ok(tasks
        .into_iter()
        .filter_map(|task| {
            let title = task.title.trim();
            if title.is_empty() {
                return None;
            }
            let phrase = task
                .due_date_description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());
            Some(CandidateTask::new(
                title,
                Priority::parse_lenient(&task.priority),
                phrase,
            ))
        })
        .collect())
}
