use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;

use crate::reminders::{NotificationPlatform, PermissionStatus, TriggerId, TriggerRequest};
use crate::uniffi_interface::errors::SmartGymError;

#[derive(Debug, Clone, uniffi::Record)]
pub struct TriggerRequestInfo {
    pub weekday_index: u8,
    pub title: String,
    pub body: String,
    /// RFC 3339 with the local offset.
    pub fire_at: String,
    pub fire_at_epoch_seconds: i64,
    pub repeats_weekly: bool,
}

impl From<&TriggerRequest> for TriggerRequestInfo {
    fn from(r: &TriggerRequest) -> Self {
        TriggerRequestInfo {
            weekday_index: r.weekday_index,
            title: r.title.clone(),
            body: r.body.clone(),
            fire_at: r.fire_at.to_rfc3339(),
            fire_at_epoch_seconds: r.fire_at.timestamp(),
            repeats_weekly: r.repeats_weekly,
        }
    }
}

/// Implemented by the mobile shell on top of the OS notification API.
#[uniffi::export(with_foreign)]
pub trait ForeignNotificationPlatform: Send + Sync {
    fn request_permission(&self) -> bool;

    fn schedule(&self, request: TriggerRequestInfo) -> Result<String, SmartGymError>;

    fn cancel(&self, trigger_id: String) -> Result<(), SmartGymError>;
}

/// Runs the blocking foreign callbacks off the async workers.
pub struct ForeignPlatformAdapter {
    inner: Arc<dyn ForeignNotificationPlatform>,
}

impl ForeignPlatformAdapter {
    pub fn new(inner: Arc<dyn ForeignNotificationPlatform>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl NotificationPlatform for ForeignPlatformAdapter {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        let inner = self.inner.clone();
        let granted = tokio::task::spawn_blocking(move || inner.request_permission()).await?;
        Ok(PermissionStatus::from(granted))
    }

    async fn schedule(&self, request: &TriggerRequest) -> Result<TriggerId> {
        let inner = self.inner.clone();
        let info = TriggerRequestInfo::from(request);
        let id = tokio::task::spawn_blocking(move || inner.schedule(info))
            .await?
            .map_err(|e| anyhow!(e.to_string()))?;
        Ok(TriggerId::new(id))
    }

    async fn cancel(&self, trigger_id: &TriggerId) -> Result<()> {
        let inner = self.inner.clone();
        let id = trigger_id.as_str().to_string();
        tokio::task::spawn_blocking(move || inner.cancel(id))
            .await?
            .map_err(|e| anyhow!(e.to_string()))
    }
}
