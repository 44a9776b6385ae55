use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ReminderDay;

/// Opaque handle the OS scheduler returned for a registered trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerId(String);

impl TriggerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub weekday_index: u8,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<FixedOffset>,
    pub repeats_weekly: bool,
}

impl TriggerRequest {
    pub fn for_day(day: &ReminderDay, fire_at: DateTime<FixedOffset>) -> Self {
        Self {
            weekday_index: day.weekday_index(),
            title: "Time to hit the gym!".to_string(),
            body: format!(
                "Don't forget your {} workout.",
                day.display_name().to_lowercase()
            ),
            fire_at,
            repeats_weekly: true,
        }
    }
}

/// The three OS scheduler operations reminders rely on.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus>;

    async fn schedule(&self, request: &TriggerRequest) -> Result<TriggerId>;

    async fn cancel(&self, trigger_id: &TriggerId) -> Result<()>;
}

