//! Reminder settings persistence and scheduling.

use crate::db::operations::{get_setting, put_setting};
use crate::reminders::{
    NOTIFICATION_DAYS_KEY, NOTIFICATIONS_ENABLED_KEY, ReconcileOutcome, ReminderSettings,
    ToggleOutcome,
};
use crate::session::Session;
use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use log::{debug, error, warn};

impl Session {
    /// Stored reminder settings, or the defaults when nothing was saved yet.
    pub async fn reminder_settings(&self) -> Result<ReminderSettings> {
        let enabled = get_setting(&self.db_pool, NOTIFICATIONS_ENABLED_KEY).await?;
        let days = get_setting(&self.db_pool, NOTIFICATION_DAYS_KEY).await?;
        ReminderSettings::from_stored(enabled.as_deref(), days.as_deref())
    }

    pub async fn save_reminder_settings(&self, settings: &ReminderSettings) -> Result<()> {
        put_setting(
            &self.db_pool,
            NOTIFICATIONS_ENABLED_KEY,
            &settings.enabled_json()?,
        )
        .await?;
        put_setting(&self.db_pool, NOTIFICATION_DAYS_KEY, &settings.days_json()?).await?;
        debug!("Saved reminder settings");
        Ok(())
    }

    /// Saves the edited configuration and reschedules every enabled day.
    pub async fn apply_reminders(&self, settings: &mut ReminderSettings) -> Result<ReconcileOutcome> {
        self.apply_reminders_at(settings, &Local::now()).await
    }

    pub async fn apply_reminders_at<Tz: TimeZone>(
        &self,
        settings: &mut ReminderSettings,
        now: &DateTime<Tz>,
    ) -> Result<ReconcileOutcome> {
        self.save_reminder_settings(settings).await?;
        let outcome = self.reminder_scheduler.reconcile(settings, now).await?;
        if let ReconcileOutcome::Completed(report) = &outcome {
            if report.has_failures() {
                warn!(
                    "{} reminder days could not be scheduled",
                    report.failures().count()
                );
            }
        }
        if outcome != ReconcileOutcome::PermissionDenied {
            self.persist_triggers(settings).await?;
        }
        Ok(outcome)
    }

    pub async fn set_reminders_enabled(
        &self,
        settings: &mut ReminderSettings,
        enabled: bool,
    ) -> Result<ToggleOutcome> {
        self.set_reminders_enabled_at(settings, enabled, &Local::now())
            .await
    }

    pub async fn set_reminders_enabled_at<Tz: TimeZone>(
        &self,
        settings: &mut ReminderSettings,
        enabled: bool,
        now: &DateTime<Tz>,
    ) -> Result<ToggleOutcome> {
        let outcome = self
            .reminder_scheduler
            .set_enabled(settings, enabled, now)
            .await?;
        if outcome != ToggleOutcome::PermissionDenied {
            self.persist_triggers(settings).await?;
        }
        Ok(outcome)
    }

    /// Saves settings after the platform handed out or took back triggers.
    /// A failed save leaves the new handles only in memory, so they are named
    /// in the log and the error.
    async fn persist_triggers(&self, settings: &ReminderSettings) -> Result<()> {
        if let Err(e) = self.save_reminder_settings(settings).await {
            let handles: Vec<String> = settings
                .days
                .iter()
                .filter_map(|d| d.scheduled_trigger_id())
                .map(|id| id.to_string())
                .collect();
            error!(
                "Reminder settings not saved, triggers [{}] are untracked: {}",
                handles.join(", "),
                e
            );
            return Err(e.context(format!(
                "Untracked reminder triggers: [{}]",
                handles.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::reminders::testing::RecordingPlatform;
    use crate::reminders::{PermissionStatus, ReconcileOutcome, ToggleOutcome, TriggerId};
    use crate::session::Session;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[tokio::test]
    async fn applied_triggers_survive_a_reload() {
        let platform = Arc::new(RecordingPlatform::granted());
        let session = Session::in_memory(platform.clone()).await.unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 21, 10, 0, 0).unwrap();

        let mut settings = session.reminder_settings().await.unwrap();
        assert!(!settings.enabled);
        settings.day_mut(6).unwrap().toggle();
        let outcome = session
            .set_reminders_enabled_at(&mut settings, true, &now)
            .await
            .unwrap();
        assert!(matches!(outcome, ToggleOutcome::Enabled(_)));

        let reloaded = session.reminder_settings().await.unwrap();
        assert!(reloaded.enabled);
        assert_eq!(reloaded.live_trigger_count(), 6);
        assert_eq!(reloaded, settings);

        let mut reloaded = reloaded;
        let outcome = session
            .apply_reminders_at(&mut reloaded, &now)
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Completed(_)));
        assert_eq!(platform.live_count(), 6);
    }

    #[tokio::test]
    async fn failed_save_names_the_untracked_triggers() {
        let session = Session::in_memory(Arc::new(RecordingPlatform::granted()))
            .await
            .unwrap();
        let mut settings = session.reminder_settings().await.unwrap();
        settings
            .day_mut(2)
            .unwrap()
            .set_trigger(Some(TriggerId::new("trigger-42")));

        session.db_pool.close().await;
        let err = session.persist_triggers(&settings).await.unwrap_err();

        assert!(err.to_string().contains("trigger-42"));
    }

    #[tokio::test]
    async fn disabled_apply_saves_cleared_handles() {
        let platform = Arc::new(RecordingPlatform::granted());
        let session = Session::in_memory(platform.clone()).await.unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 21, 10, 0, 0).unwrap();
        let mut settings = session.reminder_settings().await.unwrap();
        session
            .set_reminders_enabled_at(&mut settings, true, &now)
            .await
            .unwrap();

        platform.fail_cancel_for(4);
        session
            .set_reminders_enabled_at(&mut settings, false, &now)
            .await
            .unwrap();
        assert_eq!(
            session.reminder_settings().await.unwrap().live_trigger_count(),
            1
        );

        platform.clear_failures();
        let outcome = session
            .apply_reminders_at(&mut settings, &now)
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::NotificationsDisabled);
        assert_eq!(platform.live_count(), 0);
        assert_eq!(
            session.reminder_settings().await.unwrap().live_trigger_count(),
            0
        );
    }

    #[tokio::test]
    async fn denied_toggle_is_not_persisted() {
        let platform = Arc::new(RecordingPlatform::new(PermissionStatus::Denied));
        let session = Session::in_memory(platform).await.unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 21, 10, 0, 0).unwrap();

        let mut settings = session.reminder_settings().await.unwrap();
        let outcome = session
            .set_reminders_enabled_at(&mut settings, true, &now)
            .await
            .unwrap();

        assert_eq!(outcome, ToggleOutcome::PermissionDenied);
        assert!(!session.reminder_settings().await.unwrap().enabled);
    }
}
