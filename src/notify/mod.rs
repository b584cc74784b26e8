//! Notification delivery service.
//!
//! The pending-request set is owned by the service; tasktrack only creates
//! requests and removes them by identifier.
//!
//! - `JournalNotificationCenter`: JSONL file, compacted to the pending set on cancel
//! - `MemoryNotificationCenter`: in-process, records every call

pub mod journal;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::NotificationRequest;

pub use journal::JournalNotificationCenter;
pub use memory::{MemoryNotificationCenter, ServiceCall};

/// Errors reported by a notification service
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification '{identifier}' rejected: {reason}")]
    Rejected { identifier: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Journal task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Platform notification service
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Add a pending request
    async fn create(&self, request: &NotificationRequest) -> Result<(), NotificationError>;

    /// Remove pending requests by identifier; unknown identifiers are ignored
    async fn cancel(&self, identifiers: &[String]) -> Result<(), NotificationError>;

    /// Currently pending requests, for display only
    async fn pending(&self) -> Result<Vec<NotificationRequest>, NotificationError>;
}
