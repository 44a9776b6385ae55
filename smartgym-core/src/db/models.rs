use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::performance::{ExerciseRef, MachineRef, PerformanceRecord, RawPerformance};

// User models
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub auth_uuid: String,
    pub pseudo: String,
    pub general_level: String,
    pub registered_at: DateTime<Utc>,
}

// Machine models
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub qr_code: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMachine {
    pub qr_code: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

// Exercise models
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub machine_id: Option<i64>,
    pub title: String,
    pub category: Option<String>,
    pub instructions: Option<String>,
    pub recommended_load_kg: Option<f64>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewExercise {
    pub machine_id: Option<i64>,
    pub title: String,
    pub category: Option<String>,
    pub instructions: Option<String>,
    pub recommended_load_kg: Option<f64>,
    pub level: Option<String>,
}

// Performance models
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Performance {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub series_count: i64,
    pub reps_count: i64,
    pub load_kg: Option<f64>,
    pub performed_at: DateTime<Utc>,
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let load_str = self
            .load_kg
            .map(|l| format!(" @ {:.1}kg", l))
            .unwrap_or_default();

        write!(
            f,
            "Exercise #{}: {} x {} reps{}",
            self.exercise_id, self.series_count, self.reps_count, load_str
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewPerformance {
    pub user_id: i64,
    pub exercise_id: i64,
    pub series_count: i64,
    pub reps_count: i64,
    pub load_kg: Option<f64>,
}

/// Performance row left-joined to its exercise and that exercise's machine.
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceWithMachineRow {
    pub id: i64,
    pub series_count: i64,
    pub reps_count: i64,
    pub load_kg: Option<f64>,
    pub performed_at: DateTime<Utc>,
    pub exercise_id: Option<i64>,
    pub exercise_title: Option<String>,
    pub machine_id: Option<i64>,
    pub machine_name: Option<String>,
}

impl From<PerformanceWithMachineRow> for RawPerformance {
    fn from(row: PerformanceWithMachineRow) -> Self {
        let machine = match (row.machine_id, row.machine_name) {
            (Some(id), Some(name)) => Some(MachineRef { id, name }),
            _ => None,
        };
        let exercise = match (row.exercise_id, row.exercise_title) {
            (Some(id), Some(title)) => Some(ExerciseRef { id, title, machine }),
            _ => None,
        };

        RawPerformance {
            record: PerformanceRecord {
                id: row.id,
                date: row.performed_at,
                series_count: row.series_count,
                reps_count: row.reps_count,
                load_kg: row.load_kg,
            },
            exercise,
        }
    }
}

/// Recent performance with the exercise title, for the home screen list.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RecentPerformance {
    pub id: i64,
    pub exercise_id: i64,
    pub exercise_title: String,
    pub category: Option<String>,
    pub series_count: i64,
    pub reps_count: i64,
    pub load_kg: Option<f64>,
    pub performed_at: DateTime<Utc>,
}

// Goal models
#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub id: i64,
    pub user_id: i64,
    pub goal_type: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// Machine guidance models
#[derive(Debug, Clone, FromRow)]
pub struct RecommendationRow {
    pub id: i64,
    pub machine_id: i64,
    pub level: String,
    pub weight_kg: f64,
    pub reps: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct NutritionPlanRow {
    pub id: i64,
    pub machine_id: i64,
    pub level: String,
    pub title: String,
    pub description: String,
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fats: String,
    pub tips: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct NutritionMealRow {
    pub id: i64,
    pub plan_id: i64,
    pub position: i64,
    pub time_label: String,
    pub calories: String,
    pub items: String,
}
