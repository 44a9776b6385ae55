use crate::db::operations::{
    add_goal, delete_goal, get_active_goals, get_goal, toggle_goal, update_goal_description,
};
use crate::goals::{Goal, GoalType};
use crate::session::Session;
use anyhow::{Result, bail};

impl Session {
    pub async fn active_goals(&self) -> Result<Vec<Goal>> {
        let user_id = self.require_user_id().await?;
        get_active_goals(&self.db_pool, user_id).await
    }

    pub async fn add_goal(&self, goal_type: GoalType, description: &str) -> Result<Goal> {
        let user_id = self.require_user_id().await?;
        add_goal(&self.db_pool, user_id, goal_type, description).await
    }

    pub async fn edit_goal(&self, goal_id: i64, description: &str) -> Result<Goal> {
        self.owned_goal(goal_id).await?;
        update_goal_description(&self.db_pool, goal_id, description).await
    }

    pub async fn toggle_goal(&self, goal_id: i64) -> Result<Goal> {
        self.owned_goal(goal_id).await?;
        toggle_goal(&self.db_pool, goal_id).await
    }

    pub async fn delete_goal(&self, goal_id: i64) -> Result<u64> {
        self.owned_goal(goal_id).await?;
        delete_goal(&self.db_pool, goal_id).await
    }

    async fn owned_goal(&self, goal_id: i64) -> Result<Goal> {
        let user_id = self.require_user_id().await?;
        let goal = get_goal(&self.db_pool, goal_id).await?;
        if goal.user_id != user_id {
            bail!("Goal {} does not belong to user {}", goal_id, user_id);
        }
        Ok(goal)
    }
}

#[cfg(test)]
mod tests {
    use crate::goals::GoalType;
    use crate::reminders::testing::RecordingPlatform;
    use crate::session::Session;
    use std::sync::Arc;

    async fn session() -> Session {
        Session::in_memory(Arc::new(RecordingPlatform::granted()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn goals_are_scoped_to_the_user() {
        let session = session().await;
        session.login("owner", "owner").await.unwrap();
        let goal = session
            .add_goal(GoalType::Strength, "Bench 100kg")
            .await
            .unwrap();
        assert_eq!(session.active_goals().await.unwrap().len(), 4);

        session.login("intruder", "intruder").await.unwrap();
        assert!(session.edit_goal(goal.id, "mine now").await.is_err());
        assert!(session.delete_goal(goal.id).await.is_err());

        session.login("owner", "owner").await.unwrap();
        let done = session.toggle_goal(goal.id).await.unwrap();
        assert!(!done.active);
        assert_eq!(session.active_goals().await.unwrap().len(), 3);
    }
}
