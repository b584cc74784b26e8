//! Task store.
//!
//! Simple JSON document holding every task, loaded and saved whole.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use crate::domain::Task;

/// On-disk task document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    /// Format version
    pub version: u32,

    pub tasks: Vec<Task>,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self {
            version: 1,
            tasks: Vec::new(),
        }
    }

    /// Add a task, replacing any task with the same id
    pub fn upsert(&mut self, task: Task) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else {
            self.tasks.push(task);
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    /// Find a task by full id or unique id prefix
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Task> {
        let mut matches = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(prefix));

        let first = matches
            .next()
            .with_context(|| format!("No task with id starting '{}'", prefix))?;
        if matches.next().is_some() {
            anyhow::bail!("Task id prefix '{}' is ambiguous", prefix);
        }
        Ok(first)
    }

    /// The To-Do list: incomplete tasks, soonest due first, undated last
    pub fn incomplete(&self) -> Vec<&Task> {
        let mut open: Vec<&Task> = self.tasks.iter().filter(|t| !t.completed).collect();
        open.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.priority.cmp(&a.priority),
        });
        open
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }
}

/// File location of a task document
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the task list (empty if the file does not exist yet)
    pub async fn load(&self) -> Result<TaskList> {
        if !self.path.exists() {
            return Ok(TaskList::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read tasks: {}", self.path.display()))?;

        serde_json::from_str(&content).context("Failed to parse tasks JSON")
    }

    /// Save the task list
    pub async fn save(&self, list: &TaskList) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(list)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write tasks: {}", self.path.display()))?;

        Ok(())
    }
}
