//! Weekly workout reminders.
//!
//! A [`ReminderSettings`] holds the top-level switch plus one [`ReminderDay`]
//! per weekday. The [`ReminderScheduler`] reconciles that configuration with
//! the OS scheduler behind [`NotificationPlatform`].

mod occurrence;
mod platform;
mod scheduler;
#[cfg(test)]
pub(crate) mod testing;

pub use occurrence::{next_occurrence, weekday_from_index};
pub use platform::{NotificationPlatform, PermissionStatus, TriggerId, TriggerRequest};
pub use scheduler::{
    DayOutcome, DayReport, FailureStage, ReconcileOutcome, ReconcileReport, ReminderScheduler,
    ToggleOutcome,
};

use anyhow::{Result, anyhow, bail};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub const NOTIFICATIONS_ENABLED_KEY: &str = "notifications_enabled";
pub const NOTIFICATION_DAYS_KEY: &str = "notification_days";

const WEEKDAY_HOUR: u8 = 18;
const WEEKEND_HOUR: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredReminderDay")]
pub struct ReminderDay {
    weekday_index: u8,
    display_name: String,
    enabled: bool,
    hour: u8,
    minute: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_trigger_id: Option<TriggerId>,
}

impl ReminderDay {
    pub fn new(weekday: Weekday, enabled: bool, hour: u8, minute: u8) -> Result<Self> {
        validate_time(hour, minute)?;
        Ok(Self {
            weekday_index: weekday.num_days_from_sunday() as u8,
            display_name: weekday_name(weekday).to_string(),
            enabled,
            hour,
            minute,
            scheduled_trigger_id: None,
        })
    }

    fn with_defaults(weekday: Weekday) -> Self {
        let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        Self {
            weekday_index: weekday.num_days_from_sunday() as u8,
            display_name: weekday_name(weekday).to_string(),
            enabled: !weekend,
            hour: default_hour(weekday),
            minute: 0,
            scheduled_trigger_id: None,
        }
    }

    pub fn weekday_index(&self) -> u8 {
        self.weekday_index
    }

    pub fn weekday(&self) -> Weekday {
        // weekday_index is validated on every construction path
        weekday_from_index(self.weekday_index).unwrap_or(Weekday::Sun)
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn scheduled_trigger_id(&self) -> Option<&TriggerId> {
        self.scheduled_trigger_id.as_ref()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_trigger_id.is_some()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn set_time(&mut self, hour: u8, minute: u8) -> Result<()> {
        validate_time(hour, minute)?;
        self.hour = hour;
        self.minute = minute;
        Ok(())
    }

    pub fn step_hour(&mut self, up: bool) {
        self.hour = if up {
            (self.hour + 1) % 24
        } else {
            (self.hour + 23) % 24
        };
    }

    pub fn step_minute(&mut self, up: bool) {
        self.minute = if up {
            (self.minute + 1) % 60
        } else {
            (self.minute + 59) % 60
        };
    }

    /// Moves the minute by `delta`, wrapping within the hour. The hour is left alone.
    pub fn shift_minutes(&mut self, delta: i32) {
        self.minute = (self.minute as i32 + delta).rem_euclid(60) as u8;
    }

    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    pub(crate) fn set_trigger(&mut self, trigger_id: Option<TriggerId>) {
        self.scheduled_trigger_id = trigger_id;
    }
}

/// Persisted shape. Older entries may lack hour/minute, and may use the
/// short field names of the first settings format.
#[derive(Deserialize)]
struct StoredReminderDay {
    #[serde(alias = "id")]
    weekday_index: u8,
    #[serde(alias = "name")]
    display_name: Option<String>,
    enabled: bool,
    hour: Option<u8>,
    minute: Option<u8>,
    #[serde(default, alias = "notificationId")]
    scheduled_trigger_id: Option<TriggerId>,
}

impl TryFrom<StoredReminderDay> for ReminderDay {
    type Error = anyhow::Error;

    fn try_from(stored: StoredReminderDay) -> Result<Self> {
        let weekday = weekday_from_index(stored.weekday_index)
            .ok_or_else(|| anyhow!("Invalid weekday index: {}", stored.weekday_index))?;
        let hour = stored.hour.unwrap_or_else(|| default_hour(weekday));
        let minute = stored.minute.unwrap_or(0);
        validate_time(hour, minute)?;

        Ok(Self {
            weekday_index: stored.weekday_index,
            display_name: stored
                .display_name
                .unwrap_or_else(|| weekday_name(weekday).to_string()),
            enabled: stored.enabled,
            hour,
            minute,
            scheduled_trigger_id: stored.scheduled_trigger_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub days: Vec<ReminderDay>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            days: default_days(),
        }
    }
}

impl ReminderSettings {
    /// Rebuilds settings from their stored JSON values; missing values fall back to defaults.
    pub fn from_stored(enabled: Option<&str>, days: Option<&str>) -> Result<Self> {
        let mut settings = Self::default();
        if let Some(enabled) = enabled {
            settings.enabled = serde_json::from_str(enabled)?;
        }
        if let Some(days) = days {
            settings.days = serde_json::from_str(days)?;
        }
        Ok(settings)
    }

    pub fn enabled_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.enabled)?)
    }

    pub fn days_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.days)?)
    }

    pub fn day(&self, weekday_index: u8) -> Option<&ReminderDay> {
        self.days.iter().find(|d| d.weekday_index == weekday_index)
    }

    pub fn day_mut(&mut self, weekday_index: u8) -> Result<&mut ReminderDay> {
        self.days
            .iter_mut()
            .find(|d| d.weekday_index == weekday_index)
            .ok_or_else(|| anyhow!("No reminder configured for weekday {}", weekday_index))
    }

    pub fn live_trigger_count(&self) -> usize {
        self.days.iter().filter(|d| d.is_scheduled()).count()
    }
}

/// Monday first, Sunday last.
pub fn default_days() -> Vec<ReminderDay> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .map(ReminderDay::with_defaults)
    .collect()
}

fn default_hour(weekday: Weekday) -> u8 {
    match weekday {
        Weekday::Sat | Weekday::Sun => WEEKEND_HOUR,
        _ => WEEKDAY_HOUR,
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn validate_time(hour: u8, minute: u8) -> Result<()> {
    if hour > 23 {
        bail!("Invalid hour: {} (expected 0-23)", hour);
    }
    if minute > 59 {
        bail!("Invalid minute: {} (expected 0-59)", minute);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_week() {
        let days = default_days();
        assert_eq!(days.len(), 7);
        let indices: Vec<u8> = days.iter().map(|d| d.weekday_index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6, 0]);

        let monday = &days[0];
        assert!(monday.enabled());
        assert_eq!(monday.time_label(), "18:00");
        assert_eq!(monday.display_name(), "Monday");

        let sunday = &days[6];
        assert!(!sunday.enabled());
        assert_eq!(sunday.time_label(), "10:00");
        assert!(days.iter().all(|d| !d.is_scheduled()));
    }

    #[test]
    fn time_steps_wrap() {
        let mut day = ReminderDay::new(Weekday::Tue, true, 23, 59).unwrap();
        day.step_hour(true);
        day.step_minute(true);
        assert_eq!(day.time_label(), "00:00");

        day.step_hour(false);
        day.step_minute(false);
        assert_eq!(day.time_label(), "23:59");
    }

    #[test]
    fn minute_shift_stays_within_the_hour() {
        let mut day = ReminderDay::new(Weekday::Thu, true, 7, 50).unwrap();
        day.shift_minutes(15);
        assert_eq!(day.time_label(), "07:05");
        day.shift_minutes(-15);
        assert_eq!(day.time_label(), "07:50");
        day.shift_minutes(-55);
        assert_eq!(day.time_label(), "07:55");
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert!(ReminderDay::new(Weekday::Mon, true, 24, 0).is_err());
        let mut day = ReminderDay::new(Weekday::Mon, true, 8, 0).unwrap();
        assert!(day.set_time(8, 60).is_err());
        assert_eq!(day.time_label(), "08:00");
    }

    #[test]
    fn settings_round_trip_keeps_trigger_handles() {
        let mut settings = ReminderSettings::default();
        settings.enabled = true;
        settings
            .day_mut(3)
            .unwrap()
            .set_trigger(Some(TriggerId::new("abc")));

        let restored = ReminderSettings::from_stored(
            Some(&settings.enabled_json().unwrap()),
            Some(&settings.days_json().unwrap()),
        )
        .unwrap();

        assert_eq!(restored, settings);
        assert_eq!(
            restored.day(3).unwrap().scheduled_trigger_id(),
            Some(&TriggerId::new("abc"))
        );
    }

    #[test]
    fn legacy_entries_get_default_times() {
        let legacy = r#"[
            {"id": 1, "name": "Lundi", "enabled": true},
            {"id": 0, "name": "Dimanche", "enabled": false, "notificationId": "n-7"},
            {"id": 3, "name": "Mercredi", "enabled": true, "hour": 7, "minute": 30}
        ]"#;

        let settings = ReminderSettings::from_stored(Some("true"), Some(legacy)).unwrap();

        assert!(settings.enabled);
        assert_eq!(settings.day(1).unwrap().time_label(), "18:00");
        assert_eq!(settings.day(1).unwrap().display_name(), "Lundi");
        assert_eq!(settings.day(0).unwrap().time_label(), "10:00");
        assert!(settings.day(0).unwrap().is_scheduled());
        assert_eq!(settings.day(3).unwrap().time_label(), "07:30");
    }

    #[test]
    fn invalid_stored_weekday_is_an_error() {
        let bad = r#"[{"weekday_index": 9, "enabled": true}]"#;
        assert!(ReminderSettings::from_stored(None, Some(bad)).is_err());
    }

    #[test]
    fn missing_storage_gives_defaults() {
        let settings = ReminderSettings::from_stored(None, None).unwrap();
        assert_eq!(settings, ReminderSettings::default());
    }
}
