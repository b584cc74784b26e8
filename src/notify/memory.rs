//! In-process notification center.
//!
//! Keeps the pending set in memory and records every call in order, which
//! makes it the service of choice for dry runs and tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::NotificationRequest;

use super::{NotificationError, NotificationService};

/// A call received by the memory center
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Create(String),
    Cancel(Vec<String>),
}

#[derive(Debug, Default)]
struct State {
    pending: BTreeMap<String, NotificationRequest>,
    calls: Vec<ServiceCall>,
}

/// Memory-backed notification center
#[derive(Debug, Default)]
pub struct MemoryNotificationCenter {
    state: Mutex<State>,
    /// Identifiers whose create calls fail, to simulate a rejecting platform
    reject: Vec<String>,
}

impl MemoryNotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A center that rejects creates for the given identifiers
    pub fn rejecting(identifiers: Vec<String>) -> Self {
        Self {
            state: Mutex::default(),
            reject: identifiers,
        }
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    /// Pending requests keyed by identifier
    pub fn snapshot(&self) -> BTreeMap<String, NotificationRequest> {
        self.lock().pending.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-call
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NotificationService for MemoryNotificationCenter {
    async fn create(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        let mut state = self.lock();
        state.calls.push(ServiceCall::Create(request.identifier.clone()));

        if self.reject.contains(&request.identifier) {
            return Err(NotificationError::Rejected {
                identifier: request.identifier.clone(),
                reason: "rejected by platform".to_string(),
            });
        }
        if state.pending.contains_key(&request.identifier) {
            return Err(NotificationError::Rejected {
                identifier: request.identifier.clone(),
                reason: "a request with this identifier is already pending".to_string(),
            });
        }

        state.pending.insert(request.identifier.clone(), request.clone());
        Ok(())
    }

    async fn cancel(&self, identifiers: &[String]) -> Result<(), NotificationError> {
        let mut state = self.lock();
        state.calls.push(ServiceCall::Cancel(identifiers.to_vec()));
        for id in identifiers {
            state.pending.remove(id);
        }
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<NotificationRequest>, NotificationError> {
        let mut pending: Vec<_> = self.lock().pending.values().cloned().collect();
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at));
        Ok(pending)
    }
}
