//! Acceptance of reviewed candidates.
//!
//! Due-date phrases are resolved here, once, at review time. Persisted
//! tasks only ever carry concrete dates.

use chrono::NaiveDateTime;

use crate::domain::{CandidateTask, Task};
use crate::schedule::DueDatePhraseResolver;

/// Turn the selected candidates into new tasks, preserving order
pub fn accept_candidates(
    candidates: &[CandidateTask],
    review_time: NaiveDateTime,
    resolver: &DueDatePhraseResolver,
) -> Vec<Task> {
    candidates
        .iter()
        .filter(|c| c.selected)
        .filter_map(|c| {
            let title = c.title.trim();
            if title.is_empty() {
                return None;
            }
            let due = resolver.resolve(c.due_date_phrase.as_deref(), review_time);
            Some(Task::new(title, c.priority, due))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use chrono::NaiveDate;

    #[test]
    fn test_only_selected_are_accepted() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 29).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let mut skipped = CandidateTask::new("Skip me", Priority::Low, None);
        skipped.toggle();
        let candidates = vec![
            CandidateTask::new("Call mom", Priority::High, Some("Tomorrow".to_string())),
            skipped,
            CandidateTask::new("   ", Priority::Medium, None),
        ];

        let tasks = accept_candidates(&candidates, now, &DueDatePhraseResolver::default());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call mom");
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(
            tasks[0].due_date,
            NaiveDate::from_ymd_opt(2026, 1, 30).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(!tasks[0].completed);
    }
}
