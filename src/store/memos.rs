//! Voice memo store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::domain::VoiceMemo;

/// On-disk memo document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoList {
    pub version: u32,
    pub memos: Vec<VoiceMemo>,
}

impl Default for MemoList {
    fn default() -> Self {
        Self {
            version: 1,
            memos: Vec::new(),
        }
    }
}

impl MemoList {
    pub fn get(&self, id: &str) -> Option<&VoiceMemo> {
        self.memos.iter().find(|m| m.id == id)
    }

    /// Add a memo, replacing one with the same id
    pub fn upsert(&mut self, memo: VoiceMemo) {
        if let Some(existing) = self.memos.iter_mut().find(|m| m.id == memo.id) {
            *existing = memo;
        } else {
            self.memos.push(memo);
        }
    }
}

/// File location of the memo document
#[derive(Debug, Clone)]
pub struct MemoStore {
    path: PathBuf,
}

impl MemoStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn load(&self) -> Result<MemoList> {
        if !self.path.exists() {
            return Ok(MemoList::default());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read memos: {}", self.path.display()))?;

        serde_json::from_str(&content).context("Failed to parse memos JSON")
    }

    pub async fn save(&self, list: &MemoList) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(list)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write memos: {}", self.path.display()))
    }
}
