//! Notification planning.
//!
//! Planning is pure: `(tasks, prefs, now)` in, an ordered `NotificationPlan`
//! out. Nothing reads back the service's pending set; every pass cancels all
//! identifiers it could ever have created, then recreates what should exist.
//! `apply` then issues the plan against a `NotificationService`, best-effort.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::domain::{
    daily_digest_id, weekly_digest_id, NotificationOp, NotificationPlan, NotificationPreferences,
    NotificationRequest, Task,
};
use crate::notify::NotificationService;

/// Errors constructing a scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Digest lookahead of {lookahead} days must be between 1 and the cancel window of {cancel_window} days")]
    InvalidWindow { lookahead: u32, cancel_window: u32 },
}

/// Computes which notifications should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationScheduler {
    /// Digests are planned for day offsets 1..=lookahead_days
    lookahead_days: u32,
    /// Digest identifiers 0..=cancel_window_days are cancelled every pass
    cancel_window_days: u32,
    /// Local time digests fire at
    digest_time: NaiveTime,
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self {
            lookahead_days: 7,
            cancel_window_days: 14,
            digest_time: NaiveTime::from_hms_opt(5, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Counts from applying a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub cancelled: usize,
    pub created: usize,
    pub failed: usize,
}

impl NotificationScheduler {
    /// Create a scheduler; the lookahead must fit inside the cancel window
    pub fn new(
        lookahead_days: u32,
        cancel_window_days: u32,
        digest_time: NaiveTime,
    ) -> Result<Self, SchedulerError> {
        if lookahead_days == 0 || lookahead_days > cancel_window_days {
            return Err(SchedulerError::InvalidWindow {
                lookahead: lookahead_days,
                cancel_window: cancel_window_days,
            });
        }
        Ok(Self {
            lookahead_days,
            cancel_window_days,
            digest_time,
        })
    }

    pub fn lookahead_days(&self) -> u32 {
        self.lookahead_days
    }

    /// Full pass: due alerts for every task, then digests
    pub fn reschedule(
        &self,
        tasks: &[Task],
        prefs: &NotificationPreferences,
        now: NaiveDateTime,
    ) -> NotificationPlan {
        let mut plan = self.plan_due_notifications(tasks, prefs, now);
        plan.extend(self.plan_digests(tasks, prefs, now));
        plan
    }

    /// Cancel-then-maybe-create for a single task's due alert
    pub fn plan_task(
        &self,
        task: &Task,
        prefs: &NotificationPreferences,
        now: NaiveDateTime,
    ) -> NotificationPlan {
        let mut plan = NotificationPlan::new();
        plan.cancel(vec![task.notification_id()]);

        if !prefs.effective_due_date() || task.completed {
            return plan;
        }

        match task.due_date {
            Some(due) if due > now => {
                plan.create(NotificationRequest::task_due(task.notification_id(), &task.title, due));
            }
            _ => {}
        }

        plan
    }

    /// Due alerts for every task, in task order
    pub fn plan_due_notifications(
        &self,
        tasks: &[Task],
        prefs: &NotificationPreferences,
        now: NaiveDateTime,
    ) -> NotificationPlan {
        let mut plan = NotificationPlan::new();
        for task in tasks {
            plan.extend(self.plan_task(task, prefs, now));
        }
        plan
    }

    /// Every digest identifier this scheduler may have issued
    pub fn digest_identifiers(&self) -> Vec<String> {
        (0..=self.cancel_window_days)
            .flat_map(|i| [daily_digest_id(i), weekly_digest_id(i)])
            .collect()
    }

    /// Daily and weekly digests for the next `lookahead_days` days.
    ///
    /// On a Monday with the weekly digest enabled only the weekly digest is
    /// considered for that day, even if the daily digest is also enabled.
    pub fn plan_digests(
        &self,
        tasks: &[Task],
        prefs: &NotificationPreferences,
        now: NaiveDateTime,
    ) -> NotificationPlan {
        let mut plan = NotificationPlan::new();
        plan.cancel(self.digest_identifiers());

        let daily = prefs.effective_daily();
        let weekly = prefs.effective_weekly();
        if !daily && !weekly {
            return plan;
        }

        let today = now.date();
        for offset in 1..=self.lookahead_days {
            let Some(fire) = self.fire_date(today, offset) else {
                continue;
            };

            if fire.weekday() == Weekday::Mon && weekly {
                let count = count_due_in_week(tasks, fire);
                if count > 0 {
                    plan.create(NotificationRequest::weekly_digest(offset, count, fire));
                }
            } else if daily {
                let count = count_due_on_day(tasks, fire.date());
                if count > 0 {
                    plan.create(NotificationRequest::daily_digest(offset, count, fire));
                }
            }
        }

        plan
    }

    fn fire_date(&self, today: NaiveDate, offset: u32) -> Option<NaiveDateTime> {
        today
            .checked_add_days(Days::new(u64::from(offset)))
            .map(|d| d.and_time(self.digest_time))
    }

    /// Issue a plan in order. Failures are logged and counted, never retried.
    #[instrument(skip_all, fields(ops = plan.ops.len()))]
    pub async fn apply(
        &self,
        plan: &NotificationPlan,
        service: &dyn NotificationService,
    ) -> ApplyReport {
        let mut report = ApplyReport::default();

        for op in &plan.ops {
            match op {
                NotificationOp::Cancel(identifiers) => match service.cancel(identifiers).await {
                    Ok(()) => report.cancelled += identifiers.len(),
                    Err(e) => {
                        warn!(count = identifiers.len(), error = %e, "Failed to cancel notifications");
                        report.failed += 1;
                    }
                },
                NotificationOp::Create(request) => match service.create(request).await {
                    Ok(()) => {
                        debug!(identifier = %request.identifier, fire_at = %request.fire_at, "Scheduled notification");
                        report.created += 1;
                    }
                    Err(e) => {
                        warn!(identifier = %request.identifier, error = %e, "Failed to schedule notification");
                        report.failed += 1;
                    }
                },
            }
        }

        report
    }
}

/// Incomplete tasks due in `[fire, fire + 7 days)`
fn count_due_in_week(tasks: &[Task], fire: NaiveDateTime) -> usize {
    let Some(week_end) = fire.checked_add_days(Days::new(7)) else {
        return 0;
    };
    tasks
        .iter()
        .filter(|t| !t.completed)
        .filter_map(|t| t.due_date)
        .filter(|due| *due >= fire && *due < week_end)
        .count()
}

/// Incomplete tasks due on the given calendar day, at any time of day
fn count_due_on_day(tasks: &[Task], day: NaiveDate) -> usize {
    tasks
        .iter()
        .filter(|t| !t.completed)
        .filter_map(|t| t.due_date)
        .filter(|due| due.date() == day)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotificationKind, Priority};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn all_on() -> NotificationPreferences {
        NotificationPreferences {
            notifications_enabled: true,
            notify_on_due_date: true,
            daily_digest_enabled: true,
            weekly_digest_enabled: true,
        }
    }

    #[test]
    fn test_window_validation() {
        let five_am = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        assert!(NotificationScheduler::new(7, 14, five_am).is_ok());
        assert!(NotificationScheduler::new(15, 14, five_am).is_err());
        assert!(NotificationScheduler::new(0, 14, five_am).is_err());
    }

    #[test]
    fn test_digest_identifiers_cover_window() {
        let ids = NotificationScheduler::default().digest_identifiers();
        assert_eq!(ids.len(), 30);
        assert!(ids.contains(&"digest_daily_0".to_string()));
        assert!(ids.contains(&"digest_weekly_14".to_string()));
    }

    #[test]
    fn test_completed_task_only_cancels() {
        let mut task = Task::new("Done already", Priority::Low, Some(at(2026, 2, 1, 9, 0)));
        task.completed = true;
        let plan = NotificationScheduler::default().plan_task(&task, &all_on(), at(2026, 1, 29, 10, 0));
        assert_eq!(plan.ops, vec![NotificationOp::Cancel(vec![task.notification_id()])]);
    }

    #[test]
    fn test_daily_digest_counts_tasks_due_before_fire_time() {
        // Due at 01:00 on the digest day, before the 05:00 fire time, still counts
        let tasks = vec![Task::new("Early", Priority::Medium, Some(at(2026, 1, 30, 1, 0)))];
        let plan = NotificationScheduler::default().plan_digests(&tasks, &all_on(), at(2026, 1, 29, 10, 0));
        let created: Vec<_> = plan.created().collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].kind, NotificationKind::DailyDigest);
        assert_eq!(created[0].identifier, "digest_daily_1");
        assert_eq!(created[0].body, "You have 1 tasks due today.");
    }
}
