use anyhow::Result;
use chrono::{DateTime, FixedOffset, TimeZone};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;

use super::{NotificationPlatform, ReminderDay, ReminderSettings, TriggerId, TriggerRequest};
use super::occurrence::next_occurrence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Cancel,
    Schedule,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    Scheduled {
        trigger_id: TriggerId,
        fire_at: DateTime<FixedOffset>,
    },
    Unscheduled,
    Failed {
        stage: FailureStage,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub weekday_index: u8,
    pub display_name: String,
    pub outcome: DayOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub days: Vec<DayReport>,
}

impl ReconcileReport {
    pub fn scheduled_count(&self) -> usize {
        self.days
            .iter()
            .filter(|d| matches!(d.outcome, DayOutcome::Scheduled { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DayReport> {
        self.days
            .iter()
            .filter(|d| matches!(d.outcome, DayOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Completed(ReconcileReport),
    NotificationsDisabled,
    PermissionDenied,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Enabled(ReconcileReport),
    Disabled(ReconcileReport),
    /// Permission was refused; the settings were left untouched.
    PermissionDenied,
}

/// Keeps exactly one OS trigger per enabled reminder day.
pub struct ReminderScheduler {
    platform: Arc<dyn NotificationPlatform>,
}

impl ReminderScheduler {
    pub fn new(platform: Arc<dyn NotificationPlatform>) -> Self {
        Self { platform }
    }

    /// Cancels every recorded trigger and schedules the next occurrence of each
    /// enabled day. Existing triggers are always replaced, never reused.
    ///
    /// While reminders are off, only the cancellations run.
    pub async fn reconcile<Tz: TimeZone>(
        &self,
        settings: &mut ReminderSettings,
        now: &DateTime<Tz>,
    ) -> Result<ReconcileOutcome> {
        if !settings.enabled {
            if settings.live_trigger_count() > 0 {
                // left over from a disable whose cancel failed
                self.run::<Tz>(settings, None).await;
            }
            debug!("Reminders disabled, skipping reconciliation");
            return Ok(ReconcileOutcome::NotificationsDisabled);
        }

        let permission = self.platform.request_permission().await?;
        if !permission.is_granted() {
            warn!("Notification permission denied, nothing scheduled");
            return Ok(ReconcileOutcome::PermissionDenied);
        }

        let report = self.run(settings, Some(now)).await;
        Ok(ReconcileOutcome::Completed(report))
    }

    /// Flips the top-level switch. Turning on requires permission; turning off
    /// cancels every recorded trigger whatever the per-day state.
    pub async fn set_enabled<Tz: TimeZone>(
        &self,
        settings: &mut ReminderSettings,
        enabled: bool,
        now: &DateTime<Tz>,
    ) -> Result<ToggleOutcome> {
        if !enabled {
            settings.enabled = false;
            let report = self.run::<Tz>(settings, None).await;
            info!(
                "Reminders disabled, {} triggers left",
                settings.live_trigger_count()
            );
            return Ok(ToggleOutcome::Disabled(report));
        }

        let permission = self.platform.request_permission().await?;
        if !permission.is_granted() {
            warn!("Notification permission denied, keeping reminders off");
            return Ok(ToggleOutcome::PermissionDenied);
        }

        settings.enabled = true;
        let report = self.run(settings, Some(now)).await;
        info!("Reminders enabled, {} scheduled", report.scheduled_count());
        Ok(ToggleOutcome::Enabled(report))
    }

    /// `now` of `None` only clears triggers.
    async fn run<Tz: TimeZone>(
        &self,
        settings: &mut ReminderSettings,
        now: Option<&DateTime<Tz>>,
    ) -> ReconcileReport {
        let days = join_all(
            settings
                .days
                .iter_mut()
                .map(|day| self.reconcile_day(day, now)),
        )
        .await;

        let report = ReconcileReport { days };
        for failure in report.failures() {
            if let DayOutcome::Failed { stage, message } = &failure.outcome {
                warn!(
                    "Reminder for {} failed at {:?}: {}",
                    failure.display_name, stage, message
                );
            }
        }
        report
    }

    async fn reconcile_day<Tz: TimeZone>(
        &self,
        day: &mut ReminderDay,
        now: Option<&DateTime<Tz>>,
    ) -> DayReport {
        let outcome = self.replace_trigger(day, now).await;
        DayReport {
            weekday_index: day.weekday_index(),
            display_name: day.display_name().to_string(),
            outcome,
        }
    }

    async fn replace_trigger<Tz: TimeZone>(
        &self,
        day: &mut ReminderDay,
        now: Option<&DateTime<Tz>>,
    ) -> DayOutcome {
        if let Some(existing) = day.scheduled_trigger_id().cloned() {
            if let Err(e) = self.platform.cancel(&existing).await {
                // keep the handle so the day is never scheduled twice
                return DayOutcome::Failed {
                    stage: FailureStage::Cancel,
                    message: e.to_string(),
                };
            }
            debug!("Cancelled trigger {} for {}", existing, day.display_name());
            day.set_trigger(None);
        }

        let Some(now) = now else {
            return DayOutcome::Unscheduled;
        };
        if !day.enabled() {
            return DayOutcome::Unscheduled;
        }

        let Some(fire_at) = next_occurrence(
            now,
            day.weekday(),
            day.hour() as u32,
            day.minute() as u32,
        ) else {
            return DayOutcome::Failed {
                stage: FailureStage::Schedule,
                message: format!("{} does not exist in the local time zone", day.time_label()),
            };
        };
        let fire_at = fire_at.fixed_offset();

        let request = TriggerRequest::for_day(day, fire_at);
        match self.platform.schedule(&request).await {
            Ok(trigger_id) => {
                debug!(
                    "Scheduled trigger {} for {} at {}",
                    trigger_id,
                    day.display_name(),
                    fire_at
                );
                day.set_trigger(Some(trigger_id.clone()));
                DayOutcome::Scheduled {
                    trigger_id,
                    fire_at,
                }
            }
            Err(e) => DayOutcome::Failed {
                stage: FailureStage::Schedule,
                message: e.to_string(),
            },
        }
    }
}
