//! Domain types for tasktrack.
//!
//! This module contains the core data structures:
//! - Task: candidate and persisted tasks, priority
//! - Memo: recorded voice memos
//! - Notification: requests, operations and plans
//! - Preferences: notification settings

pub mod memo;
pub mod notification;
pub mod preferences;
pub mod task;

// Re-export commonly used types
pub use memo::VoiceMemo;
pub use notification::{
    daily_digest_id, weekly_digest_id, FireAt, NotificationKind, NotificationOp, NotificationPlan,
    NotificationRequest, DAILY_DIGEST_PREFIX, WEEKLY_DIGEST_PREFIX,
};
pub use preferences::{NotificationPreferences, PreferenceKey};
pub use task::{CandidateTask, Priority, Task};
