use anyhow::Result;
use async_trait::async_trait;
use log::info;
use uuid::Uuid;

use smartgym::reminders::{NotificationPlatform, PermissionStatus, TriggerId, TriggerRequest};

/// Stands in for the OS scheduler: prints each trigger and hands out UUID handles.
pub struct ConsolePlatform {
    permission: PermissionStatus,
}

impl ConsolePlatform {
    pub fn new(permission: PermissionStatus) -> Self {
        Self { permission }
    }
}

#[async_trait]
impl NotificationPlatform for ConsolePlatform {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        info!("Notification permission: {:?}", self.permission);
        Ok(self.permission)
    }

    async fn schedule(&self, request: &TriggerRequest) -> Result<TriggerId> {
        let id = Uuid::new_v4().to_string();
        info!(
            "Scheduled trigger {} at {} (weekly: {}): {} {}",
            id,
            request.fire_at.format("%a %Y-%m-%d %H:%M"),
            request.repeats_weekly,
            request.title,
            request.body
        );
        Ok(TriggerId::new(id))
    }

    async fn cancel(&self, trigger_id: &TriggerId) -> Result<()> {
        info!("Cancelled trigger {}", trigger_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn request() -> TriggerRequest {
        TriggerRequest {
            weekday_index: 1,
            title: "Time to hit the gym!".into(),
            body: "Don't forget your monday workout.".into(),
            fire_at: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2026, 10, 26, 18, 0, 0)
                .unwrap(),
            repeats_weekly: true,
        }
    }

    #[tokio::test]
    async fn handles_are_unique() {
        let platform = ConsolePlatform::new(PermissionStatus::Granted);
        let a = platform.schedule(&request()).await.unwrap();
        let b = platform.schedule(&request()).await.unwrap();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
        platform.cancel(&a).await.unwrap();
    }

    #[tokio::test]
    async fn reports_configured_permission() {
        let platform = ConsolePlatform::new(PermissionStatus::Denied);
        assert_eq!(
            platform.request_permission().await.unwrap(),
            PermissionStatus::Denied
        );
    }
}
