//! JSONL-backed notification center.
//!
//! Each create appends a JSON line and the pending set is derived by
//! replaying the file. A cancel that removes anything rewrites the file as
//! one `Created` line per request still pending, so the journal never holds
//! more lines than there are pending requests. Creating a request whose
//! identifier is already pending is rejected rather than replacing it.
//!
//! All file access runs on the blocking pool under an exclusive lock on a
//! sidecar `.lock` file, shared with other tasktrack processes.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::NotificationRequest;

use super::{NotificationError, NotificationService};

/// An entry in the notification journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub event: JournalEvent,
}

/// Journal event payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum JournalEvent {
    Created { request: NotificationRequest },
    /// Written by older journals; still honoured on replay
    Cancelled { identifiers: Vec<String> },
}

/// File-backed notification center
pub struct JournalNotificationCenter {
    path: PathBuf,
}

impl JournalNotificationCenter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Open a journal, creating its parent directory
    pub async fn open(path: &Path) -> Result<Self, NotificationError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self::new(path.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replay the journal into the pending set, keyed by identifier
    pub async fn replay(&self) -> Result<BTreeMap<String, NotificationRequest>, NotificationError> {
        self.with_lock(|path| {
            Ok(read_journal(path)?
                .into_iter()
                .map(|(id, (_, request))| (id, request))
                .collect())
        })
        .await
    }

    /// Run `op` on the blocking pool while holding the journal lock
    async fn with_lock<T, F>(&self, op: F) -> Result<T, NotificationError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, NotificationError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let lock = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(path.with_extension("lock"))?;
            lock.lock_exclusive()?;

            // Lock is released when `lock` is dropped
            op(&path)
        })
        .await?
    }
}

type PendingEntries = BTreeMap<String, (DateTime<Utc>, NotificationRequest)>;

/// Pending requests with the time each was journalled
fn read_journal(path: &Path) -> Result<PendingEntries, NotificationError> {
    let mut pending = BTreeMap::new();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(pending),
        Err(e) => return Err(e.into()),
    };

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: JournalEntry = serde_json::from_str(&line)?;
        match entry.event {
            JournalEvent::Created { request } => {
                pending.insert(request.identifier.clone(), (entry.timestamp, request));
            }
            JournalEvent::Cancelled { identifiers } => {
                for id in identifiers {
                    pending.remove(&id);
                }
            }
        }
    }

    Ok(pending)
}

fn append_entry(path: &Path, entry: &JournalEntry) -> Result<(), NotificationError> {
    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;
    file.flush()?;
    Ok(())
}

/// Replace the journal with one `Created` line per pending request
fn write_compacted(path: &Path, pending: &PendingEntries) -> Result<(), NotificationError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;

    for (timestamp, request) in pending.values() {
        let entry = JournalEntry {
            timestamp: *timestamp,
            event: JournalEvent::Created {
                request: request.clone(),
            },
        };
        writeln!(temp, "{}", serde_json::to_string(&entry)?)?;
    }
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), pending = pending.len(), "Compacted notification journal");
    Ok(())
}

#[async_trait]
impl NotificationService for JournalNotificationCenter {
    async fn create(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        let request = request.clone();
        self.with_lock(move |path| {
            if read_journal(path)?.contains_key(&request.identifier) {
                return Err(NotificationError::Rejected {
                    identifier: request.identifier,
                    reason: "a request with this identifier is already pending".to_string(),
                });
            }

            append_entry(
                path,
                &JournalEntry {
                    timestamp: Utc::now(),
                    event: JournalEvent::Created { request },
                },
            )
        })
        .await
    }

    async fn cancel(&self, identifiers: &[String]) -> Result<(), NotificationError> {
        let identifiers = identifiers.to_vec();
        self.with_lock(move |path| {
            let mut pending = read_journal(path)?;
            let before = pending.len();
            for id in &identifiers {
                pending.remove(id);
            }

            if pending.len() != before {
                write_compacted(path, &pending)?;
            }
            Ok(())
        })
        .await
    }

    async fn pending(&self) -> Result<Vec<NotificationRequest>, NotificationError> {
        let mut pending: Vec<_> = self.replay().await?.into_values().collect();
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.identifier.cmp(&b.identifier)));
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn request(id: &str, day: u32) -> NotificationRequest {
        let due = NaiveDate::from_ymd_opt(2026, 2, day).unwrap().and_hms_opt(9, 0, 0).unwrap();
        NotificationRequest::task_due(id.to_string(), "Test", due)
    }

    async fn create_test_center() -> (JournalNotificationCenter, TempDir) {
        let temp = TempDir::new().unwrap();
        let center = JournalNotificationCenter::open(&temp.path().join("notifications.jsonl"))
            .await
            .unwrap();
        (center, temp)
    }

    fn line_count(path: &Path) -> usize {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count()
    }

    #[tokio::test]
    async fn test_create_and_cancel() {
        let (center, _temp) = create_test_center().await;

        center.create(&request("a", 2)).await.unwrap();
        center.create(&request("b", 1)).await.unwrap();

        let pending = center.pending().await.unwrap();
        let ids: Vec<_> = pending.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        center.cancel(&["a".to_string(), "missing".to_string()]).await.unwrap();
        let pending = center.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].identifier, "b");
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let (center, _temp) = create_test_center().await;

        center.create(&request("a", 2)).await.unwrap();
        let err = center.create(&request("a", 3)).await.unwrap_err();
        assert!(matches!(err, NotificationError::Rejected { .. }));

        // Cancel first, then the create goes through
        center.cancel(&["a".to_string()]).await.unwrap();
        center.create(&request("a", 3)).await.unwrap();
        assert_eq!(center.pending().await.unwrap()[0].fire_at.day, 3);
    }

    #[tokio::test]
    async fn test_replay_of_missing_file_is_empty() {
        let (center, _temp) = create_test_center().await;
        assert!(center.replay().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_compacts_to_pending_set() {
        let (center, _temp) = create_test_center().await;

        for _ in 0..5 {
            center.cancel(&["a".to_string(), "b".to_string()]).await.unwrap();
            center.create(&request("a", 2)).await.unwrap();
            center.create(&request("b", 3)).await.unwrap();
        }
        assert_eq!(line_count(center.path()), 2);

        center.cancel(&["a".to_string()]).await.unwrap();
        assert_eq!(line_count(center.path()), 1);
        assert_eq!(center.pending().await.unwrap()[0].identifier, "b");
    }

    #[tokio::test]
    async fn test_cancel_of_nothing_pending_leaves_file_alone() {
        let (center, _temp) = create_test_center().await;

        center.cancel(&["a".to_string()]).await.unwrap();
        assert!(!center.path().exists());
    }

    #[tokio::test]
    async fn test_older_cancel_lines_are_replayed() {
        let (center, _temp) = create_test_center().await;
        center.create(&request("a", 2)).await.unwrap();
        center.create(&request("b", 3)).await.unwrap();

        let cancelled = JournalEntry {
            timestamp: Utc::now(),
            event: JournalEvent::Cancelled {
                identifiers: vec!["a".to_string()],
            },
        };
        append_entry(center.path(), &cancelled).unwrap();

        let ids: Vec<_> = center.replay().await.unwrap().into_keys().collect();
        assert_eq!(ids, vec!["b"]);
    }
}
