use crate::goals::GoalType;
use crate::guidance::TrainingLevel;
use crate::session::Session;
use crate::uniffi_interface::errors::SmartGymError;
use crate::uniffi_interface::objects::{
    ExerciseInfo, GoalInfo, MachineHistory, MachineInfo, NutritionPlanInfo, PerformanceEntry,
    RecommendationInfo, ReminderResult, ReminderSettingsInfo, StatisticsInfo,
};
use crate::uniffi_interface::platform::{ForeignNotificationPlatform, ForeignPlatformAdapter};
use log::*;
use std::sync::Arc;

#[uniffi::export]
pub fn create_session(
    db_path: &str,
    platform: Arc<dyn ForeignNotificationPlatform>,
) -> std::result::Result<Arc<Session>, SmartGymError> {
    // Foreign callers have no runtime of their own.
    let rt = crate::runtime::init_global_runtime_blocking();
    let adapter = Arc::new(ForeignPlatformAdapter::new(platform));
    let session = rt.block_on(Session::new(db_path, adapter))?;
    Ok(Arc::new(session))
}

#[uniffi::export]
pub fn login(
    session: &Session,
    auth_uuid: &str,
    pseudo: &str,
) -> std::result::Result<i64, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let user = rt.block_on(session.login(auth_uuid, pseudo))?;
    Ok(user.id)
}

#[uniffi::export]
pub fn logout(session: &Session) {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(session.logout());
}

#[uniffi::export]
pub fn machine_by_qr_code(
    session: &Session,
    qr_code: &str,
) -> std::result::Result<MachineInfo, SmartGymError> {
    debug!("Resolving scanned code: {}", qr_code);
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(session.machine_by_qr_code(qr_code))?
        .map(MachineInfo::from)
        .ok_or_else(|| SmartGymError::NotFound(format!("machine for code {}", qr_code.trim())))
}

#[uniffi::export]
pub fn exercises_for_machine(
    session: &Session,
    machine_id: i64,
) -> std::result::Result<Vec<ExerciseInfo>, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let exercises = rt.block_on(session.exercises_for_machine(machine_id))?;
    Ok(exercises.into_iter().map(ExerciseInfo::from).collect())
}

#[uniffi::export]
pub fn category_filters(session: &Session) -> Vec<String> {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(session.category_filters())
}

/// Resolves an optional level name, falling back to the user's own level.
async fn level_or_default(
    session: &Session,
    level: Option<String>,
) -> std::result::Result<TrainingLevel, SmartGymError> {
    match level {
        Some(level) => Ok(level.parse()?),
        None => Ok(session.training_level().await?),
    }
}

#[uniffi::export]
pub fn training_level(session: &Session) -> std::result::Result<String, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    Ok(rt.block_on(session.training_level())?.as_str().to_string())
}

#[uniffi::export]
pub fn set_training_level(session: &Session, level: &str) -> std::result::Result<(), SmartGymError> {
    let level: TrainingLevel = level.parse()?;
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(session.set_training_level(level))?;
    Ok(())
}

#[uniffi::export]
pub fn recommendations_for_machine(
    session: &Session,
    machine_id: i64,
) -> std::result::Result<Vec<RecommendationInfo>, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let recommendations = rt.block_on(session.recommendations(machine_id))?;
    Ok(recommendations.into_iter().map(RecommendationInfo::from).collect())
}

#[uniffi::export]
pub fn recommendation_for(
    session: &Session,
    machine_id: i64,
    level: Option<String>,
) -> std::result::Result<Option<RecommendationInfo>, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(async {
        let level = level_or_default(session, level).await?;
        let recommendation = session.recommendation_for(machine_id, level).await?;
        Ok(recommendation.map(RecommendationInfo::from))
    })
}

#[uniffi::export]
pub fn nutrition_plan(
    session: &Session,
    machine_id: i64,
    level: Option<String>,
) -> std::result::Result<Option<NutritionPlanInfo>, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(async {
        let level = level_or_default(session, level).await?;
        let plan = session.nutrition_plan(machine_id, level).await?;
        Ok(plan.map(NutritionPlanInfo::from))
    })
}

#[uniffi::export]
pub fn nutrition_plan_levels(
    session: &Session,
    machine_id: i64,
) -> std::result::Result<Vec<String>, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let levels = rt.block_on(session.nutrition_levels(machine_id))?;
    Ok(levels.iter().map(|l| l.as_str().to_string()).collect())
}

#[uniffi::export]
pub fn finish_exercise(
    session: &Session,
    exercise_id: i64,
    series_count: i64,
    reps_count: i64,
    load_kg: Option<f64>,
) -> std::result::Result<PerformanceEntry, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let performance = rt.block_on(session.finish_exercise(
        exercise_id,
        series_count,
        reps_count,
        load_kg,
    ))?;
    Ok(PerformanceEntry::from(performance))
}

#[uniffi::export]
pub fn performance_history(session: &Session) -> Vec<MachineHistory> {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(session.performance_history())
        .iter()
        .map(MachineHistory::from)
        .collect()
}

#[uniffi::export]
pub fn statistics(session: &Session) -> std::result::Result<StatisticsInfo, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    Ok(rt.block_on(session.statistics())?.into())
}

#[uniffi::export]
pub fn active_goals(session: &Session) -> std::result::Result<Vec<GoalInfo>, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let goals = rt.block_on(session.active_goals())?;
    Ok(goals.into_iter().map(GoalInfo::from).collect())
}

#[uniffi::export]
pub fn add_goal(
    session: &Session,
    goal_type: &str,
    description: &str,
) -> std::result::Result<GoalInfo, SmartGymError> {
    let goal_type: GoalType = goal_type.parse()?;
    let rt = crate::runtime::init_global_runtime_blocking();
    Ok(rt.block_on(session.add_goal(goal_type, description))?.into())
}

#[uniffi::export]
pub fn edit_goal(
    session: &Session,
    goal_id: i64,
    description: &str,
) -> std::result::Result<GoalInfo, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    Ok(rt.block_on(session.edit_goal(goal_id, description))?.into())
}

#[uniffi::export]
pub fn toggle_goal(session: &Session, goal_id: i64) -> std::result::Result<GoalInfo, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    Ok(rt.block_on(session.toggle_goal(goal_id))?.into())
}

#[uniffi::export]
pub fn delete_goal(session: &Session, goal_id: i64) -> std::result::Result<(), SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(session.delete_goal(goal_id))?;
    Ok(())
}

#[uniffi::export]
pub fn reminder_settings(
    session: &Session,
) -> std::result::Result<ReminderSettingsInfo, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    let settings = rt.block_on(session.reminder_settings())?;
    Ok(ReminderSettingsInfo::from(&settings))
}

/// Saves the edited days and reschedules every enabled one.
#[uniffi::export]
pub fn apply_reminders(
    session: &Session,
    edited: ReminderSettingsInfo,
) -> std::result::Result<ReminderResult, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(async {
        let mut settings = session.reminder_settings().await?;
        edited.merge_into(&mut settings)?;
        let outcome = session.apply_reminders(&mut settings).await?;
        Ok(ReminderResult::from_reconcile(&outcome, &settings))
    })
}

#[uniffi::export]
pub fn set_reminders_enabled(
    session: &Session,
    enabled: bool,
) -> std::result::Result<ReminderResult, SmartGymError> {
    let rt = crate::runtime::init_global_runtime_blocking();
    rt.block_on(async {
        let mut settings = session.reminder_settings().await?;
        let outcome = session.set_reminders_enabled(&mut settings, enabled).await?;
        Ok(ReminderResult::from_toggle(&outcome, &settings))
    })
}
