//! Notification requests and the operations that create or cancel them.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Prefix of daily digest identifiers
pub const DAILY_DIGEST_PREFIX: &str = "digest_daily_";

/// Prefix of weekly digest identifiers
pub const WEEKLY_DIGEST_PREFIX: &str = "digest_weekly_";

/// Identifier of the daily digest for a day offset from today
pub fn daily_digest_id(offset: u32) -> String {
    format!("{}{}", DAILY_DIGEST_PREFIX, offset)
}

/// Identifier of the weekly digest for a day offset from today
pub fn weekly_digest_id(offset: u32) -> String {
    format!("{}{}", WEEKLY_DIGEST_PREFIX, offset)
}

/// Calendar components of a fire instant, minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FireAt {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl FireAt {
    /// Truncate a local date-time to minute precision
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }

    /// Back to a local date-time (seconds are zero)
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, 0)
    }
}

impl std::fmt::Display for FireAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// What kind of notification a request is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Alert for a single task's due date
    TaskDue,
    DailyDigest,
    WeeklyDigest,
}

/// A notification to be created on the notification service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub fire_at: FireAt,
}

impl NotificationRequest {
    /// Alert fired when a task falls due
    pub fn task_due(identifier: String, task_title: &str, due: NaiveDateTime) -> Self {
        Self {
            identifier,
            kind: NotificationKind::TaskDue,
            title: "Task Due".to_string(),
            body: format!("Your task \"{}\" is due now.", task_title),
            fire_at: FireAt::from_datetime(due),
        }
    }

    pub fn daily_digest(offset: u32, count: usize, fire: NaiveDateTime) -> Self {
        Self {
            identifier: daily_digest_id(offset),
            kind: NotificationKind::DailyDigest,
            title: "Daily Task Summary".to_string(),
            body: format!("You have {} tasks due today.", count),
            fire_at: FireAt::from_datetime(fire),
        }
    }

    pub fn weekly_digest(offset: u32, count: usize, fire: NaiveDateTime) -> Self {
        Self {
            identifier: weekly_digest_id(offset),
            kind: NotificationKind::WeeklyDigest,
            title: "Weekly Task Summary".to_string(),
            body: format!("You have {} tasks due this upcoming week.", count),
            fire_at: FireAt::from_datetime(fire),
        }
    }
}

/// One call against the notification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOp {
    /// Remove pending requests by identifier (idempotent)
    Cancel(Vec<String>),
    Create(NotificationRequest),
}

/// Ordered operations produced by a scheduling pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPlan {
    pub ops: Vec<NotificationOp>,
}

impl NotificationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&mut self, identifiers: Vec<String>) {
        if !identifiers.is_empty() {
            self.ops.push(NotificationOp::Cancel(identifiers));
        }
    }

    pub fn create(&mut self, request: NotificationRequest) {
        self.ops.push(NotificationOp::Create(request));
    }

    /// Append another plan, keeping its order
    pub fn extend(&mut self, other: NotificationPlan) {
        self.ops.extend(other.ops);
    }

    /// Every identifier cancelled by this plan
    pub fn cancelled(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().flat_map(|op| match op {
            NotificationOp::Cancel(ids) => ids.iter().map(String::as_str).collect::<Vec<_>>(),
            NotificationOp::Create(_) => Vec::new(),
        })
    }

    /// Every request created by this plan
    pub fn created(&self) -> impl Iterator<Item = &NotificationRequest> {
        self.ops.iter().filter_map(|op| match op {
            NotificationOp::Create(request) => Some(request),
            NotificationOp::Cancel(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
