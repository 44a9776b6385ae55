//! Performance history and statistics for the signed-in user.

use crate::db::models::RecentPerformance;
use crate::db::operations::{
    get_performances_with_machines, get_recent_performances, get_user_statistics,
};
use crate::performance::{MachinePerformanceGroup, RawPerformance, UserStatistics, group_by_machine};
use crate::session::Session;
use anyhow::Result;
use log::{debug, warn};

const RECENT_PERFORMANCES_LIMIT: i64 = 10;

impl Session {
    /// Per-machine groups of every logged performance, newest first.
    ///
    /// A failed fetch, or no signed-in user, yields an empty history.
    pub async fn performance_history(&self) -> Vec<MachinePerformanceGroup> {
        let Some(user_id) = self.get_user_id().await else {
            debug!("performance_history called without a user");
            return vec![];
        };

        match get_performances_with_machines(&self.db_pool, user_id).await {
            Ok(rows) => group_by_machine(rows.into_iter().map(RawPerformance::from)),
            Err(e) => {
                warn!("Failed to fetch performances for user {}: {}", user_id, e);
                vec![]
            }
        }
    }

    pub async fn recent_performances(&self) -> Result<Vec<RecentPerformance>> {
        let user_id = self.require_user_id().await?;
        get_recent_performances(&self.db_pool, user_id, RECENT_PERFORMANCES_LIMIT).await
    }

    pub async fn statistics(&self) -> Result<UserStatistics> {
        let user_id = self.require_user_id().await?;
        get_user_statistics(&self.db_pool, user_id).await
    }
}
