//! Event-driven task tracker service.
//!
//! Wires the stores, extractor, resolver and scheduler together. Every
//! mutation of the task list or of a preference re-plans the affected
//! notifications and applies the plan, best-effort.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::{
    CandidateTask, NotificationPlan, NotificationPreferences, PreferenceKey, Priority, Task, VoiceMemo,
};
use crate::extract::{ExtractionOutcome, TaskExtractor};
use crate::ingest::{compute_file_hash, transcribe};
use crate::notify::NotificationService;
use crate::schedule::{ApplyReport, Clock, DueDatePhraseResolver, NotificationScheduler, SystemClock};
use crate::store::{MemoStore, PreferencesStore, TaskList, TaskStore};

use super::review::accept_candidates;

/// A transcribed memo and what extraction found in it
#[derive(Debug, Clone)]
pub struct MemoIngest {
    pub memo: VoiceMemo,
    pub outcome: ExtractionOutcome,
    /// True when the transcript came from an earlier ingest of the same audio
    pub reused_transcript: bool,
}

/// Main tracker service
pub struct TaskTracker {
    tasks: TaskStore,
    memos: MemoStore,
    prefs: Arc<dyn PreferencesStore>,
    notifications: Arc<dyn NotificationService>,
    extractor: TaskExtractor,
    resolver: DueDatePhraseResolver,
    scheduler: NotificationScheduler,
    clock: Arc<dyn Clock>,
}

impl TaskTracker {
    /// Create a tracker with a heuristic-only extractor and default calendar rules
    pub fn new(
        tasks: TaskStore,
        memos: MemoStore,
        prefs: Arc<dyn PreferencesStore>,
        notifications: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            tasks,
            memos,
            prefs,
            notifications,
            extractor: TaskExtractor::heuristic_only(),
            resolver: DueDatePhraseResolver::default(),
            scheduler: NotificationScheduler::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_extractor(mut self, extractor: TaskExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_resolver(mut self, resolver: DueDatePhraseResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_scheduler(mut self, scheduler: NotificationScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn task_list(&self) -> Result<TaskList> {
        self.tasks.load().await
    }

    pub async fn preferences(&self) -> Result<NotificationPreferences> {
        self.prefs.load().await
    }

    /// Extract candidates from a transcript
    pub async fn extract(&self, transcript: &str) -> ExtractionOutcome {
        self.extractor.extract_outcome(transcript).await
    }

    /// Transcribe a voice memo (or reuse its stored transcript) and extract candidates
    #[instrument(skip(self, audio_path, whisper_path), fields(audio = %audio_path.display()))]
    pub async fn ingest_memo(
        &self,
        audio_path: &Path,
        whisper_path: &Path,
        model: &str,
    ) -> Result<MemoIngest> {
        let id = compute_file_hash(audio_path)
            .await
            .with_context(|| format!("Failed to read audio: {}", audio_path.display()))?;

        let mut memos = self.memos.load().await?;
        let existing = memos.get(&id).cloned();

        let (memo, reused_transcript) = match existing {
            Some(memo) if memo.is_transcribed() => {
                info!(memo = %id, "Reusing stored transcript");
                (memo, true)
            }
            existing => {
                let mut memo = existing.unwrap_or_else(|| VoiceMemo::new(id.clone(), audio_path.to_path_buf()));
                let transcript = transcribe(audio_path, whisper_path, model).await?;
                memo.transcription = Some(transcript.text);
                memo.duration_seconds = transcript.duration_seconds;
                memos.upsert(memo.clone());
                self.memos.save(&memos).await?;
                (memo, false)
            }
        };

        let transcript = memo.transcription.clone().unwrap_or_default();
        let outcome = self.extract(&transcript).await;

        Ok(MemoIngest {
            memo,
            outcome,
            reused_transcript,
        })
    }

    /// Persist the selected candidates and schedule their notifications
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn accept(&self, candidates: &[CandidateTask], memo_id: Option<&str>) -> Result<Vec<Task>> {
        let now = self.clock.now();
        let mut accepted = accept_candidates(candidates, now, &self.resolver);
        if let Some(memo_id) = memo_id {
            accepted = accepted.into_iter().map(|t| t.with_memo(memo_id)).collect();
        }

        let mut list = self.tasks.load().await?;
        for task in &accepted {
            list.upsert(task.clone());
        }
        self.tasks.save(&list).await?;

        if let Some(memo_id) = memo_id {
            self.link_memo(memo_id, &accepted).await?;
        }

        info!(count = accepted.len(), "Accepted tasks");
        self.schedule_tasks(&accepted, &list).await?;
        Ok(accepted)
    }

    /// Add a single task by hand
    pub async fn add_task(&self, title: &str, priority: Priority, due_phrase: Option<&str>) -> Result<Task> {
        let candidate = CandidateTask::new(title, priority, due_phrase.map(str::to_string));
        self.accept(std::slice::from_ref(&candidate), None)
            .await?
            .into_iter()
            .next()
            .context("Task title must not be empty")
    }

    /// Mark a task complete; its due alert is cancelled
    #[instrument(skip(self))]
    pub async fn complete(&self, id_prefix: &str) -> Result<Task> {
        let mut list = self.tasks.load().await?;
        let id = list.find_by_prefix(id_prefix)?.id;
        let task = list.get_mut(id).context("Task vanished during update")?;
        task.completed = true;
        let task = task.clone();
        self.tasks.save(&list).await?;

        self.schedule_tasks(std::slice::from_ref(&task), &list).await?;
        Ok(task)
    }

    /// Delete a task and cancel its due alert
    #[instrument(skip(self))]
    pub async fn remove(&self, id_prefix: &str) -> Result<Task> {
        let mut list = self.tasks.load().await?;
        let id = list.find_by_prefix(id_prefix)?.id;
        let task = list.remove(id).context("Task vanished during removal")?;
        self.tasks.save(&list).await?;

        let prefs = self.prefs.load().await?;
        let mut plan = NotificationPlan::new();
        plan.cancel(vec![task.notification_id()]);
        plan.extend(self.scheduler.plan_digests(&list.tasks, &prefs, self.clock.now()));
        self.scheduler.apply(&plan, self.notifications.as_ref()).await;

        Ok(task)
    }

    /// Toggle a preference and re-plan whatever it affects
    #[instrument(skip(self))]
    pub async fn set_preference(&self, key: PreferenceKey, value: bool) -> Result<ApplyReport> {
        let prefs = self.prefs.set(key, value).await?;
        let list = self.tasks.load().await?;
        let now = self.clock.now();

        let plan = match key {
            PreferenceKey::NotificationsEnabled => self.scheduler.reschedule(&list.tasks, &prefs, now),
            PreferenceKey::NotifyOnDueDate => self.scheduler.plan_due_notifications(&list.tasks, &prefs, now),
            PreferenceKey::DailyDigestEnabled | PreferenceKey::WeeklyDigestEnabled => {
                self.scheduler.plan_digests(&list.tasks, &prefs, now)
            }
        };

        Ok(self.scheduler.apply(&plan, self.notifications.as_ref()).await)
    }

    /// Re-plan every notification from scratch
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<ApplyReport> {
        let list = self.tasks.load().await?;
        let prefs = self.prefs.load().await?;
        let plan = self.scheduler.reschedule(&list.tasks, &prefs, self.clock.now());
        let report = self.scheduler.apply(&plan, self.notifications.as_ref()).await;
        info!(created = report.created, failed = report.failed, "Rescheduled notifications");
        Ok(report)
    }

    /// Due alerts for the changed tasks, then digests for the whole list
    async fn schedule_tasks(&self, changed: &[Task], list: &TaskList) -> Result<ApplyReport> {
        let prefs = self.prefs.load().await?;
        let now = self.clock.now();

        let mut plan = self.scheduler.plan_due_notifications(changed, &prefs, now);
        plan.extend(self.scheduler.plan_digests(&list.tasks, &prefs, now));

        Ok(self.scheduler.apply(&plan, self.notifications.as_ref()).await)
    }

    async fn link_memo(&self, memo_id: &str, tasks: &[Task]) -> Result<()> {
        let mut memos = self.memos.load().await?;
        let Some(mut memo) = memos.get(memo_id).cloned() else {
            return Ok(());
        };
        memo.task_ids.extend(tasks.iter().map(|t| t.id));
        memos.upsert(memo);
        self.memos.save(&memos).await
    }
}
