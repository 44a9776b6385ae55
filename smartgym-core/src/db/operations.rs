use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use sqlx::SqlitePool;

use crate::db::models::{
    Exercise, GoalRow, Machine, NewExercise, NewMachine, NewPerformance, NutritionMealRow,
    NutritionPlanRow, Performance, PerformanceWithMachineRow, RecentPerformance,
    RecommendationRow, User,
};
use crate::goals::{Goal, GoalType, default_goals};
use crate::guidance::{NewNutritionPlan, NutritionPlan, Recommendation, TrainingLevel};
use crate::performance::UserStatistics;

const DEFAULT_GENERAL_LEVEL: &str = "beginner";

const GOAL_COLUMNS: &str =
    "id, user_id, goal_type, description, active, created_at, completed_at";

// Users
pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("User {} not found", user_id))
}

pub async fn get_user_by_auth_uuid(pool: &SqlitePool, auth_uuid: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE auth_uuid = ?1")
        .bind(auth_uuid)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

/// Looks a user up by external identity, registering them (with the default
/// goals) on first sight.
pub async fn get_or_create_user(pool: &SqlitePool, auth_uuid: &str, pseudo: &str) -> Result<User> {
    if let Some(user) = get_user_by_auth_uuid(pool, auth_uuid).await? {
        return Ok(user);
    }

    info!("Registering new user for auth id {}", auth_uuid);
    let result = sqlx::query(
        "INSERT INTO users (auth_uuid, pseudo, general_level, registered_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(auth_uuid)
    .bind(pseudo)
    .bind(DEFAULT_GENERAL_LEVEL)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    let user = get_user(pool, result.last_insert_rowid()).await?;

    if let Err(e) = create_default_goals(pool, user.id).await {
        warn!("Failed to create default goals for user {}: {}", user.id, e);
    }

    Ok(user)
}

pub async fn update_user_level(pool: &SqlitePool, user_id: i64, level: TrainingLevel) -> Result<User> {
    let result = sqlx::query("UPDATE users SET general_level = ?1 WHERE id = ?2")
        .bind(level.as_str())
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("User {} not found", user_id);
    }
    get_user(pool, user_id).await
}

// Machines
pub async fn create_machine(pool: &SqlitePool, machine: &NewMachine) -> Result<Machine> {
    let result = sqlx::query(
        "INSERT INTO machines (qr_code, name, description, image_url) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&machine.qr_code)
    .bind(&machine.name)
    .bind(&machine.description)
    .bind(&machine.image_url)
    .execute(pool)
    .await?;
    get_machine(pool, result.last_insert_rowid()).await
}

pub async fn get_machine(pool: &SqlitePool, machine_id: i64) -> Result<Machine> {
    sqlx::query_as::<_, Machine>("SELECT * FROM machines WHERE id = ?1")
        .bind(machine_id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("Machine {} not found", machine_id))
}

pub async fn get_machine_by_qr_code(pool: &SqlitePool, qr_code: &str) -> Result<Option<Machine>> {
    sqlx::query_as::<_, Machine>("SELECT * FROM machines WHERE qr_code = ?1")
        .bind(qr_code)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

pub async fn get_all_machines(pool: &SqlitePool) -> Result<Vec<Machine>> {
    sqlx::query_as::<_, Machine>("SELECT * FROM machines ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

// Exercises
pub async fn create_exercise(pool: &SqlitePool, exercise: &NewExercise) -> Result<Exercise> {
    let result = sqlx::query(
        "INSERT INTO exercises (machine_id, title, category, instructions, recommended_load_kg, level)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(exercise.machine_id)
    .bind(&exercise.title)
    .bind(&exercise.category)
    .bind(&exercise.instructions)
    .bind(exercise.recommended_load_kg)
    .bind(&exercise.level)
    .execute(pool)
    .await?;
    get_exercise(pool, result.last_insert_rowid()).await
}

pub async fn get_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<Exercise> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE id = ?1")
        .bind(exercise_id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("Exercise {} not found", exercise_id))
}

pub async fn get_exercises_for_machine(pool: &SqlitePool, machine_id: i64) -> Result<Vec<Exercise>> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE machine_id = ?1 ORDER BY id")
        .bind(machine_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

/// Distinct, non-empty exercise categories in alphabetical order.
pub async fn get_exercise_categories(pool: &SqlitePool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM exercises
         WHERE category IS NOT NULL AND category != ''
         ORDER BY category",
    )
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

// Performances
pub async fn record_performance(
    pool: &SqlitePool,
    performance: &NewPerformance,
) -> Result<Performance> {
    record_performance_at(pool, performance, Utc::now()).await
}

pub async fn record_performance_at(
    pool: &SqlitePool,
    performance: &NewPerformance,
    performed_at: DateTime<Utc>,
) -> Result<Performance> {
    if performance.series_count <= 0 {
        bail!("Series count must be positive, got {}", performance.series_count);
    }
    if performance.reps_count <= 0 {
        bail!("Reps count must be positive, got {}", performance.reps_count);
    }
    if let Some(load) = performance.load_kg {
        if !load.is_finite() || load < 0.0 {
            bail!("Load must be a non-negative number, got {}", load);
        }
    }

    let result = sqlx::query(
        "INSERT INTO performances (user_id, exercise_id, series_count, reps_count, load_kg, performed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(performance.user_id)
    .bind(performance.exercise_id)
    .bind(performance.series_count)
    .bind(performance.reps_count)
    .bind(performance.load_kg)
    .bind(performed_at)
    .execute(pool)
    .await
    .context("Failed to record performance")?;

    let performance =
        sqlx::query_as::<_, Performance>("SELECT * FROM performances WHERE id = ?1")
            .bind(result.last_insert_rowid())
            .fetch_one(pool)
            .await?;
    debug!("Recorded performance {}", performance);
    Ok(performance)
}

/// Every performance of `user_id`, newest first, with its exercise and machine
/// when they exist.
pub async fn get_performances_with_machines(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<PerformanceWithMachineRow>> {
    sqlx::query_as::<_, PerformanceWithMachineRow>(
        "SELECT p.id, p.series_count, p.reps_count, p.load_kg, p.performed_at,
                e.id AS exercise_id, e.title AS exercise_title,
                m.id AS machine_id, m.name AS machine_name
         FROM performances p
         LEFT JOIN exercises e ON e.id = p.exercise_id
         LEFT JOIN machines m ON m.id = e.machine_id
         WHERE p.user_id = ?1
         ORDER BY p.performed_at DESC, p.id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_recent_performances(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<RecentPerformance>> {
    sqlx::query_as::<_, RecentPerformance>(
        "SELECT p.id, p.exercise_id, e.title AS exercise_title, e.category,
                p.series_count, p.reps_count, p.load_kg, p.performed_at
         FROM performances p
         JOIN exercises e ON e.id = p.exercise_id
         WHERE p.user_id = ?1
         ORDER BY p.performed_at DESC, p.id DESC
         LIMIT ?2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_user_statistics(pool: &SqlitePool, user_id: i64) -> Result<UserStatistics> {
    let (total_sessions, distinct_exercises) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COUNT(DISTINCT exercise_id) FROM performances WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let last_session = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT performed_at FROM performances WHERE user_id = ?1
         ORDER BY performed_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(UserStatistics {
        total_sessions,
        distinct_exercises,
        last_session,
    })
}

// Goals
pub async fn get_goal(pool: &SqlitePool, goal_id: i64) -> Result<Goal> {
    let row = sqlx::query_as::<_, GoalRow>(&format!(
        "SELECT {} FROM goals WHERE id = ?1",
        GOAL_COLUMNS
    ))
    .bind(goal_id)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Goal {} not found", goal_id))?;
    Goal::try_from(row)
}

pub async fn get_active_goals(pool: &SqlitePool, user_id: i64) -> Result<Vec<Goal>> {
    let rows = sqlx::query_as::<_, GoalRow>(&format!(
        "SELECT {} FROM goals WHERE user_id = ?1 AND active = 1
         ORDER BY created_at DESC, id DESC",
        GOAL_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Goal::try_from).collect()
}

pub async fn add_goal(
    pool: &SqlitePool,
    user_id: i64,
    goal_type: GoalType,
    description: &str,
) -> Result<Goal> {
    let description = description.trim();
    if description.is_empty() {
        bail!("Goal description cannot be empty");
    }

    let result = sqlx::query(
        "INSERT INTO goals (user_id, goal_type, description, active, created_at)
         VALUES (?1, ?2, ?3, 1, ?4)",
    )
    .bind(user_id)
    .bind(goal_type.as_str())
    .bind(description)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    get_goal(pool, result.last_insert_rowid()).await
}

pub async fn update_goal_description(
    pool: &SqlitePool,
    goal_id: i64,
    description: &str,
) -> Result<Goal> {
    let description = description.trim();
    if description.is_empty() {
        bail!("Goal description cannot be empty");
    }

    let result = sqlx::query("UPDATE goals SET description = ?1 WHERE id = ?2")
        .bind(description)
        .bind(goal_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        bail!("Goal {} not found", goal_id);
    }
    get_goal(pool, goal_id).await
}

/// Active goals become completed (stamped now); completed goals become active again.
pub async fn toggle_goal(pool: &SqlitePool, goal_id: i64) -> Result<Goal> {
    let goal = get_goal(pool, goal_id).await?;
    let completed_at = if goal.active { Some(Utc::now()) } else { None };

    sqlx::query("UPDATE goals SET active = ?1, completed_at = ?2 WHERE id = ?3")
        .bind(!goal.active)
        .bind(completed_at)
        .bind(goal_id)
        .execute(pool)
        .await?;
    get_goal(pool, goal_id).await
}

pub async fn delete_goal(pool: &SqlitePool, goal_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM goals WHERE id = ?1")
        .bind(goal_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn create_default_goals(pool: &SqlitePool, user_id: i64) -> Result<Vec<Goal>> {
    let mut goals = Vec::new();
    for (goal_type, description) in default_goals() {
        goals.push(add_goal(pool, user_id, goal_type, description).await?);
    }
    debug!("Created {} default goals for user {}", goals.len(), user_id);
    Ok(goals)
}

// Machine guidance
const LEVEL_ORDER: &str =
    "CASE level WHEN 'beginner' THEN 0 WHEN 'intermediate' THEN 1 ELSE 2 END";

/// Inserts or replaces the recommendation of `machine_id` for `level`.
pub async fn put_recommendation(
    pool: &SqlitePool,
    machine_id: i64,
    level: TrainingLevel,
    weight_kg: f64,
    reps: &str,
) -> Result<Recommendation> {
    if !weight_kg.is_finite() || weight_kg < 0.0 {
        bail!("Recommended weight must be a non-negative number, got {}", weight_kg);
    }
    let reps = reps.trim();
    if reps.is_empty() {
        bail!("Recommended reps cannot be empty");
    }

    sqlx::query(
        "INSERT INTO machine_recommendations (machine_id, level, weight_kg, reps)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(machine_id, level) DO UPDATE SET weight_kg = excluded.weight_kg, reps = excluded.reps",
    )
    .bind(machine_id)
    .bind(level.as_str())
    .bind(weight_kg)
    .bind(reps)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to store {} recommendation for machine {}", level, machine_id))?;

    get_recommendation(pool, machine_id, level)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Recommendation for machine {} vanished", machine_id))
}

pub async fn get_recommendation(
    pool: &SqlitePool,
    machine_id: i64,
    level: TrainingLevel,
) -> Result<Option<Recommendation>> {
    sqlx::query_as::<_, RecommendationRow>(
        "SELECT * FROM machine_recommendations WHERE machine_id = ?1 AND level = ?2",
    )
    .bind(machine_id)
    .bind(level.as_str())
    .fetch_optional(pool)
    .await?
    .map(Recommendation::try_from)
    .transpose()
}

/// Every level's recommendation for a machine, beginner first.
pub async fn get_recommendations_for_machine(
    pool: &SqlitePool,
    machine_id: i64,
) -> Result<Vec<Recommendation>> {
    let rows = sqlx::query_as::<_, RecommendationRow>(&format!(
        "SELECT * FROM machine_recommendations WHERE machine_id = ?1 ORDER BY {}",
        LEVEL_ORDER
    ))
    .bind(machine_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Recommendation::try_from).collect()
}

/// Stores a plan with its meals in one transaction. A machine has at most one
/// plan per level.
pub async fn create_nutrition_plan(
    pool: &SqlitePool,
    machine_id: i64,
    plan: &NewNutritionPlan,
) -> Result<NutritionPlan> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO nutrition_plans
            (machine_id, level, title, description, calories, protein, carbs, fats, tips)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(machine_id)
    .bind(plan.level.as_str())
    .bind(&plan.title)
    .bind(&plan.description)
    .bind(&plan.calories)
    .bind(&plan.macros.protein)
    .bind(&plan.macros.carbs)
    .bind(&plan.macros.fats)
    .bind(serde_json::to_string(&plan.tips)?)
    .execute(&mut *tx)
    .await
    .with_context(|| format!("Failed to store {} nutrition plan for machine {}", plan.level, machine_id))?;
    let plan_id = result.last_insert_rowid();

    for (position, meal) in plan.meals.iter().enumerate() {
        sqlx::query(
            "INSERT INTO nutrition_meals (plan_id, position, time_label, calories, items)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(plan_id)
        .bind(position as i64)
        .bind(&meal.time)
        .bind(&meal.calories)
        .bind(serde_json::to_string(&meal.items)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!("Stored nutrition plan {} for machine {}", plan_id, machine_id);

    get_nutrition_plan(pool, machine_id, plan.level)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Nutrition plan {} vanished", plan_id))
}

pub async fn get_nutrition_plan(
    pool: &SqlitePool,
    machine_id: i64,
    level: TrainingLevel,
) -> Result<Option<NutritionPlan>> {
    let Some(plan) = sqlx::query_as::<_, NutritionPlanRow>(
        "SELECT * FROM nutrition_plans WHERE machine_id = ?1 AND level = ?2",
    )
    .bind(machine_id)
    .bind(level.as_str())
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let meals = sqlx::query_as::<_, NutritionMealRow>(
        "SELECT * FROM nutrition_meals WHERE plan_id = ?1 ORDER BY position",
    )
    .bind(plan.id)
    .fetch_all(pool)
    .await?;

    NutritionPlan::from_rows(plan, meals).map(Some)
}

/// Levels that have a nutrition plan for the machine, beginner first.
pub async fn get_nutrition_plan_levels(
    pool: &SqlitePool,
    machine_id: i64,
) -> Result<Vec<TrainingLevel>> {
    let levels = sqlx::query_scalar::<_, String>(&format!(
        "SELECT level FROM nutrition_plans WHERE machine_id = ?1 ORDER BY {}",
        LEVEL_ORDER
    ))
    .bind(machine_id)
    .fetch_all(pool)
    .await?;
    levels.iter().map(|l| l.parse()).collect()
}

// Settings
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

pub async fn put_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}
