//! Machine scanning and performance logging.

use crate::db::models::{Exercise, Machine, NewPerformance, Performance};
use crate::db::operations::{
    get_exercise, get_exercise_categories, get_exercises_for_machine, get_machine_by_qr_code,
    record_performance,
};
use crate::session::Session;
use anyhow::Result;
use log::{info, warn};

/// Filter entry that matches every category.
pub const ALL_CATEGORIES: &str = "All";

impl Session {
    /// Machine behind a scanned QR code, if any.
    pub async fn machine_by_qr_code(&self, qr_code: &str) -> Result<Option<Machine>> {
        get_machine_by_qr_code(&self.db_pool, qr_code.trim()).await
    }

    pub async fn exercises_for_machine(&self, machine_id: i64) -> Result<Vec<Exercise>> {
        get_exercises_for_machine(&self.db_pool, machine_id).await
    }

    /// Category filter entries, `"All"` first. A failed fetch leaves only `"All"`.
    pub async fn category_filters(&self) -> Vec<String> {
        let mut filters = vec![ALL_CATEGORIES.to_string()];
        match get_exercise_categories(&self.db_pool).await {
            Ok(categories) => filters.extend(categories),
            Err(e) => warn!("Failed to load exercise categories: {}", e),
        }
        filters
    }

    /// Logs a finished exercise for the current user.
    pub async fn finish_exercise(
        &self,
        exercise_id: i64,
        series_count: i64,
        reps_count: i64,
        load_kg: Option<f64>,
    ) -> Result<Performance> {
        let user_id = self.require_user_id().await?;
        let exercise = get_exercise(&self.db_pool, exercise_id).await?;

        let performance = record_performance(
            &self.db_pool,
            &NewPerformance {
                user_id,
                exercise_id,
                series_count,
                reps_count,
                load_kg,
            },
        )
        .await?;
        info!(
            "User {} finished {}: {}x{}",
            user_id, exercise.title, series_count, reps_count
        );
        Ok(performance)
    }
}
