//! Notification preferences.
//!
//! Four flags, all off by default. Each specific flag only takes effect when
//! the master switch is on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User notification settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub notify_on_due_date: bool,
    #[serde(default)]
    pub daily_digest_enabled: bool,
    #[serde(default)]
    pub weekly_digest_enabled: bool,
}

impl NotificationPreferences {
    pub fn effective_due_date(&self) -> bool {
        self.notifications_enabled && self.notify_on_due_date
    }

    pub fn effective_daily(&self) -> bool {
        self.notifications_enabled && self.daily_digest_enabled
    }

    pub fn effective_weekly(&self) -> bool {
        self.notifications_enabled && self.weekly_digest_enabled
    }

    pub fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::NotificationsEnabled => self.notifications_enabled,
            PreferenceKey::NotifyOnDueDate => self.notify_on_due_date,
            PreferenceKey::DailyDigestEnabled => self.daily_digest_enabled,
            PreferenceKey::WeeklyDigestEnabled => self.weekly_digest_enabled,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, value: bool) {
        match key {
            PreferenceKey::NotificationsEnabled => self.notifications_enabled = value,
            PreferenceKey::NotifyOnDueDate => self.notify_on_due_date = value,
            PreferenceKey::DailyDigestEnabled => self.daily_digest_enabled = value,
            PreferenceKey::WeeklyDigestEnabled => self.weekly_digest_enabled = value,
        }
    }
}

/// Stored preference names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    NotificationsEnabled,
    NotifyOnDueDate,
    DailyDigestEnabled,
    WeeklyDigestEnabled,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 4] = [
        Self::NotificationsEnabled,
        Self::NotifyOnDueDate,
        Self::DailyDigestEnabled,
        Self::WeeklyDigestEnabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotificationsEnabled => "notificationsEnabled",
            Self::NotifyOnDueDate => "notifyOnDueDate",
            Self::DailyDigestEnabled => "dailyDigestEnabled",
            Self::WeeklyDigestEnabled => "weeklyDigestEnabled",
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown preference: {}", s))
    }
}
