//! Task extraction from transcripts.
//!
//! Two strategies share the `ExtractionStrategy` trait:
//! - `ModelStrategy`: asks a generative text service (may be unavailable)
//! - `HeuristicStrategy`: deterministic keyword scan, never fails
//!
//! `TaskExtractor` tries the primary strategy under a timeout and falls back
//! to the heuristic on any failure. Primary failures are logged, never
//! returned. Dropping the `extract` future cancels the primary call.

pub mod heuristic;
pub mod model;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::CandidateTask;

pub use heuristic::{extract_with_fallback, HeuristicStrategy};
pub use model::{build_prompt, parse_model_response, ModelStrategy};

/// Errors that can occur during extraction
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extraction service unavailable: {0}")]
    Unavailable(String),

    #[error("Could not parse extraction response: {0}")]
    Parse(String),

    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("No tasks found")]
    NoTasksFound,
}

/// A way of turning a transcript into candidate tasks
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &str;

    async fn extract(&self, transcript: &str) -> Result<Vec<CandidateTask>, ExtractionError>;
}

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    Primary,
    Fallback,
}

/// Result of an extraction pass
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub tasks: Vec<CandidateTask>,
    pub source: ExtractionSource,
}

impl ExtractionOutcome {
    /// The task list, or `NoTasksFound` when it is empty
    pub fn into_result(self) -> Result<Vec<CandidateTask>, ExtractionError> {
        if self.tasks.is_empty() {
            Err(ExtractionError::NoTasksFound)
        } else {
            Ok(self.tasks)
        }
    }
}

/// Primary strategy with heuristic fallback
pub struct TaskExtractor {
    primary: Option<Box<dyn ExtractionStrategy>>,
    fallback: Box<dyn ExtractionStrategy>,
    timeout: Duration,
}

impl Default for TaskExtractor {
    fn default() -> Self {
        Self::heuristic_only()
    }
}

impl TaskExtractor {
    /// Default upper bound on the primary strategy
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Extractor with a primary strategy
    pub fn new(primary: Box<dyn ExtractionStrategy>, timeout: Duration) -> Self {
        Self {
            primary: Some(primary),
            fallback: Box::new(HeuristicStrategy::new()),
            timeout,
        }
    }

    /// Extractor that only runs the heuristic
    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            fallback: Box::new(HeuristicStrategy::new()),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Replace the heuristic fallback
    pub fn with_fallback(mut self, fallback: Box<dyn ExtractionStrategy>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Extract candidate tasks, in transcript order
    pub async fn extract(&self, transcript: &str) -> Vec<CandidateTask> {
        self.extract_outcome(transcript).await.tasks
    }

    /// Extract and report which strategy produced the list
    #[instrument(skip(self, transcript), fields(chars = transcript.len()))]
    pub async fn extract_outcome(&self, transcript: &str) -> ExtractionOutcome {
        if let Some(primary) = &self.primary {
            match self.try_primary(primary.as_ref(), transcript).await {
                Ok(tasks) => {
                    info!(strategy = primary.name(), count = tasks.len(), "Extracted tasks");
                    return ExtractionOutcome {
                        tasks,
                        source: ExtractionSource::Primary,
                    };
                }
                Err(e) => {
                    warn!(strategy = primary.name(), error = %e, "Primary extraction failed, using heuristic");
                }
            }
        }

        let tasks = match self.fallback.extract(transcript).await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(strategy = self.fallback.name(), error = %e, "Fallback extraction failed");
                Vec::new()
            }
        };
        info!(strategy = self.fallback.name(), count = tasks.len(), "Extracted tasks");
        ExtractionOutcome {
            tasks,
            source: ExtractionSource::Fallback,
        }
    }

    async fn try_primary(
        &self,
        primary: &dyn ExtractionStrategy,
        transcript: &str,
    ) -> Result<Vec<CandidateTask>, ExtractionError> {
        tokio::time::timeout(self.timeout, primary.extract(transcript))
            .await
            .map_err(|_| ExtractionError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;

    struct FixedStrategy(Result<Vec<CandidateTask>, String>);

    #[async_trait]
    impl ExtractionStrategy for FixedStrategy {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn extract(&self, _transcript: &str) -> Result<Vec<CandidateTask>, ExtractionError> {
            self.0.clone().map_err(ExtractionError::Unavailable)
        }
    }

    struct SlowStrategy;

    #[async_trait]
    impl ExtractionStrategy for SlowStrategy {
        fn name(&self) -> &str {
            "slow"
        }

        async fn extract(&self, _transcript: &str) -> Result<Vec<CandidateTask>, ExtractionError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![CandidateTask::new("Never returned", Priority::High, None)])
        }
    }

    const TRANSCRIPT: &str = "I need to pick up the dry cleaning. Nice weather today.";

    #[tokio::test]
    async fn test_primary_result_is_used() {
        let primary = FixedStrategy(Ok(vec![CandidateTask::new("From model", Priority::Low, None)]));
        let extractor = TaskExtractor::new(Box::new(primary), Duration::from_secs(1));

        let outcome = extractor.extract_outcome(TRANSCRIPT).await;
        assert_eq!(outcome.source, ExtractionSource::Primary);
        assert_eq!(outcome.tasks[0].title, "From model");
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back() {
        let primary = FixedStrategy(Err("offline".to_string()));
        let extractor = TaskExtractor::new(Box::new(primary), Duration::from_secs(1));

        let outcome = extractor.extract_outcome(TRANSCRIPT).await;
        assert_eq!(outcome.source, ExtractionSource::Fallback);
        assert_eq!(outcome.tasks, extract_with_fallback(TRANSCRIPT));
        assert_eq!(outcome.tasks[0].title, "Pick up the dry cleaning");
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_timeout_falls_back() {
        let extractor = TaskExtractor::new(Box::new(SlowStrategy), Duration::from_secs(5));

        let outcome = extractor.extract_outcome(TRANSCRIPT).await;
        assert_eq!(outcome.source, ExtractionSource::Fallback);
        assert_eq!(outcome.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_runs_through_strategy() {
        let primary = FixedStrategy(Err("offline".to_string()));
        let fallback = FixedStrategy(Ok(vec![CandidateTask::new("From fallback", Priority::Medium, None)]));
        let extractor = TaskExtractor::new(Box::new(primary), Duration::from_secs(1))
            .with_fallback(Box::new(fallback));

        let outcome = extractor.extract_outcome(TRANSCRIPT).await;
        assert_eq!(outcome.source, ExtractionSource::Fallback);
        assert_eq!(outcome.tasks[0].title, "From fallback");
    }

    #[tokio::test]
    async fn test_failing_fallback_yields_no_tasks() {
        let extractor = TaskExtractor::heuristic_only()
            .with_fallback(Box::new(FixedStrategy(Err("broken".to_string()))));

        let outcome = extractor.extract_outcome(TRANSCRIPT).await;
        assert!(outcome.tasks.is_empty());
        assert!(matches!(outcome.into_result(), Err(ExtractionError::NoTasksFound)));
    }

    #[tokio::test]
    async fn test_empty_outcome_is_no_tasks_found() {
        let extractor = TaskExtractor::heuristic_only();
        let outcome = extractor.extract_outcome("Lovely sunset.").await;
        assert!(matches!(outcome.into_result(), Err(ExtractionError::NoTasksFound)));
    }
}
