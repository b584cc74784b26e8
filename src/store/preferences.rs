//! Preferences persistence.
//!
//! Flags are stored under their fixed names (`notificationsEnabled`, ...).
//! Missing flags read as false.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use crate::domain::{NotificationPreferences, PreferenceKey};

/// Where notification preferences live
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn load(&self) -> Result<NotificationPreferences>;

    async fn save(&self, prefs: &NotificationPreferences) -> Result<()>;

    /// Set one flag and return the updated preferences
    async fn set(&self, key: PreferenceKey, value: bool) -> Result<NotificationPreferences> {
        let mut prefs = self.load().await?;
        prefs.set(key, value);
        self.save(&prefs).await?;
        Ok(prefs)
    }
}

/// Preferences kept in a JSON file
#[derive(Debug, Clone)]
pub struct JsonPreferencesStore {
    path: PathBuf,
}

impl JsonPreferencesStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PreferencesStore for JsonPreferencesStore {
    async fn load(&self) -> Result<NotificationPreferences> {
        if !self.path.exists() {
            return Ok(NotificationPreferences::default());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read preferences: {}", self.path.display()))?;

        serde_json::from_str(&content).context("Failed to parse preferences JSON")
    }

    async fn save(&self, prefs: &NotificationPreferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))
    }
}
