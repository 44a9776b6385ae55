use chrono::{DateTime, Utc};

use crate::db;
use crate::goals::Goal;
use crate::guidance::{NutritionPlan, Recommendation};
use crate::performance::{
    ChartMetric, ChartSeries, MachinePerformanceGroup, PerformanceRecord, UserStatistics,
};
use crate::reminders::{
    DayOutcome, ReconcileOutcome, ReconcileReport, ReminderDay, ReminderSettings, ToggleOutcome,
};
use crate::uniffi_interface::errors::SmartGymError;

fn timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339()
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct MachineInfo {
    pub id: i64,
    pub qr_code: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<db::models::Machine> for MachineInfo {
    fn from(m: db::models::Machine) -> Self {
        MachineInfo {
            id: m.id,
            qr_code: m.qr_code,
            name: m.name,
            description: m.description,
            image_url: m.image_url,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct ExerciseInfo {
    pub id: i64,
    pub machine_id: Option<i64>,
    pub title: String,
    pub category: Option<String>,
    pub instructions: Option<String>,
    pub recommended_load_kg: Option<f64>,
    pub level: Option<String>,
}

impl From<db::models::Exercise> for ExerciseInfo {
    fn from(e: db::models::Exercise) -> Self {
        ExerciseInfo {
            id: e.id,
            machine_id: e.machine_id,
            title: e.title,
            category: e.category,
            instructions: e.instructions,
            recommended_load_kg: e.recommended_load_kg,
            level: e.level,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct PerformanceEntry {
    pub id: i64,
    pub date: String,
    pub series_count: i64,
    pub reps_count: i64,
    pub load_kg: Option<f64>,
}

impl From<&PerformanceRecord> for PerformanceEntry {
    fn from(r: &PerformanceRecord) -> Self {
        PerformanceEntry {
            id: r.id,
            date: timestamp(&r.date),
            series_count: r.series_count,
            reps_count: r.reps_count,
            load_kg: r.load_kg,
        }
    }
}

impl From<db::models::Performance> for PerformanceEntry {
    fn from(p: db::models::Performance) -> Self {
        PerformanceEntry {
            id: p.id,
            date: timestamp(&p.performed_at),
            series_count: p.series_count,
            reps_count: p.reps_count,
            load_kg: p.load_kg,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl From<ChartSeries> for ChartData {
    fn from(s: ChartSeries) -> Self {
        ChartData {
            labels: s.labels,
            values: s.values,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct MachineHistory {
    pub machine_id: i64,
    pub machine_name: String,
    pub exercise_id: i64,
    pub exercise_title: String,
    pub performances: Vec<PerformanceEntry>,
    pub average_reps: i64,
    pub total_volume: f64,
    pub last_load: f64,
    pub has_load_data: bool,
    pub reps_chart: ChartData,
    pub load_chart: ChartData,
}

impl From<&MachinePerformanceGroup> for MachineHistory {
    fn from(g: &MachinePerformanceGroup) -> Self {
        let summary = g.summary();
        MachineHistory {
            machine_id: g.machine_id,
            machine_name: g.machine_name.clone(),
            exercise_id: g.exercise_id,
            exercise_title: g.exercise_title.clone(),
            performances: g.records.iter().map(PerformanceEntry::from).collect(),
            average_reps: summary.average_reps,
            total_volume: summary.total_volume,
            last_load: summary.last_load,
            has_load_data: g.has_load_data(),
            reps_chart: g.chart(ChartMetric::Reps).into(),
            load_chart: g.chart(ChartMetric::Load).into(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct StatisticsInfo {
    pub total_sessions: i64,
    pub distinct_exercises: i64,
    pub last_session: Option<String>,
}

impl From<UserStatistics> for StatisticsInfo {
    fn from(s: UserStatistics) -> Self {
        StatisticsInfo {
            total_sessions: s.total_sessions,
            distinct_exercises: s.distinct_exercises,
            last_session: s.last_session.as_ref().map(timestamp),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct GoalInfo {
    pub id: i64,
    pub goal_type: String,
    pub description: String,
    pub active: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<Goal> for GoalInfo {
    fn from(g: Goal) -> Self {
        GoalInfo {
            id: g.id,
            goal_type: g.goal_type.as_str().to_string(),
            description: g.description,
            active: g.active,
            created_at: timestamp(&g.created_at),
            completed_at: g.completed_at.as_ref().map(timestamp),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct RecommendationInfo {
    pub machine_id: i64,
    pub level: String,
    pub weight_kg: f64,
    pub reps: String,
}

impl From<Recommendation> for RecommendationInfo {
    fn from(r: Recommendation) -> Self {
        RecommendationInfo {
            machine_id: r.machine_id,
            level: r.level.as_str().to_string(),
            weight_kg: r.weight_kg,
            reps: r.reps,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct MacrosInfo {
    pub protein: String,
    pub carbs: String,
    pub fats: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct MealInfo {
    pub time: String,
    pub items: Vec<String>,
    pub calories: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct NutritionPlanInfo {
    pub id: i64,
    pub machine_id: i64,
    pub level: String,
    pub title: String,
    pub description: String,
    pub calories: String,
    pub macros: MacrosInfo,
    pub meals: Vec<MealInfo>,
    pub tips: Vec<String>,
}

impl From<NutritionPlan> for NutritionPlanInfo {
    fn from(p: NutritionPlan) -> Self {
        NutritionPlanInfo {
            id: p.id,
            machine_id: p.machine_id,
            level: p.level.as_str().to_string(),
            title: p.title,
            description: p.description,
            calories: p.calories,
            macros: MacrosInfo {
                protein: p.macros.protein,
                carbs: p.macros.carbs,
                fats: p.macros.fats,
            },
            meals: p
                .meals
                .into_iter()
                .map(|m| MealInfo {
                    time: m.time,
                    items: m.items,
                    calories: m.calories,
                })
                .collect(),
            tips: p.tips,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct ReminderDayInfo {
    pub weekday_index: u8,
    pub display_name: String,
    pub enabled: bool,
    pub hour: u8,
    pub minute: u8,
    pub scheduled: bool,
}

impl From<&ReminderDay> for ReminderDayInfo {
    fn from(d: &ReminderDay) -> Self {
        ReminderDayInfo {
            weekday_index: d.weekday_index(),
            display_name: d.display_name().to_string(),
            enabled: d.enabled(),
            hour: d.hour(),
            minute: d.minute(),
            scheduled: d.is_scheduled(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct ReminderSettingsInfo {
    pub enabled: bool,
    pub days: Vec<ReminderDayInfo>,
}

impl From<&ReminderSettings> for ReminderSettingsInfo {
    fn from(s: &ReminderSettings) -> Self {
        ReminderSettingsInfo {
            enabled: s.enabled,
            days: s.days.iter().map(ReminderDayInfo::from).collect(),
        }
    }
}

impl ReminderSettingsInfo {
    /// Copies the user's edits onto `stored`, keeping its trigger handles.
    pub fn merge_into(&self, stored: &mut ReminderSettings) -> Result<(), SmartGymError> {
        for edit in &self.days {
            let day = stored.day_mut(edit.weekday_index)?;
            day.set_enabled(edit.enabled);
            day.set_time(edit.hour, edit.minute)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ReminderStatus {
    Scheduled,
    Disabled,
    PermissionDenied,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct ReminderFailure {
    pub weekday_index: u8,
    pub display_name: String,
    pub message: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct ReminderResult {
    pub status: ReminderStatus,
    pub scheduled_count: u32,
    pub failures: Vec<ReminderFailure>,
    pub settings: ReminderSettingsInfo,
}

impl ReminderResult {
    fn from_report(
        status: ReminderStatus,
        report: Option<&ReconcileReport>,
        settings: &ReminderSettings,
    ) -> Self {
        let failures = report
            .map(|r| {
                r.failures()
                    .filter_map(|d| match &d.outcome {
                        DayOutcome::Failed { message, .. } => Some(ReminderFailure {
                            weekday_index: d.weekday_index,
                            display_name: d.display_name.clone(),
                            message: message.clone(),
                        }),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        ReminderResult {
            status,
            scheduled_count: report.map(|r| r.scheduled_count() as u32).unwrap_or(0),
            failures,
            settings: settings.into(),
        }
    }

    pub fn from_reconcile(outcome: &ReconcileOutcome, settings: &ReminderSettings) -> Self {
        match outcome {
            ReconcileOutcome::Completed(report) => {
                Self::from_report(ReminderStatus::Scheduled, Some(report), settings)
            }
            ReconcileOutcome::NotificationsDisabled => {
                Self::from_report(ReminderStatus::Disabled, None, settings)
            }
            ReconcileOutcome::PermissionDenied => {
                Self::from_report(ReminderStatus::PermissionDenied, None, settings)
            }
        }
    }

    pub fn from_toggle(outcome: &ToggleOutcome, settings: &ReminderSettings) -> Self {
        match outcome {
            ToggleOutcome::Enabled(report) => {
                Self::from_report(ReminderStatus::Scheduled, Some(report), settings)
            }
            ToggleOutcome::Disabled(report) => {
                Self::from_report(ReminderStatus::Disabled, Some(report), settings)
            }
            ToggleOutcome::PermissionDenied => {
                Self::from_report(ReminderStatus::PermissionDenied, None, settings)
            }
        }
    }
}
