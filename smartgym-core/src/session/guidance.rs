//! Level-based recommendations and nutrition plans for a scanned machine.

use crate::db::models::User;
use crate::db::operations::{
    get_nutrition_plan, get_nutrition_plan_levels, get_recommendation,
    get_recommendations_for_machine, get_user, update_user_level,
};
use crate::guidance::{NutritionPlan, Recommendation, TrainingLevel};
use crate::session::Session;
use anyhow::Result;
use log::{info, warn};

impl Session {
    /// The signed-in user's level. Beginner when nobody is signed in.
    pub async fn training_level(&self) -> Result<TrainingLevel> {
        let Some(user_id) = self.get_user_id().await else {
            return Ok(TrainingLevel::default());
        };
        let user = get_user(&self.db_pool, user_id).await?;
        Ok(user.general_level.parse().unwrap_or_else(|e| {
            warn!("User {} has {}, using beginner", user_id, e);
            TrainingLevel::default()
        }))
    }

    pub async fn set_training_level(&self, level: TrainingLevel) -> Result<User> {
        let user_id = self.require_user_id().await?;
        let user = update_user_level(&self.db_pool, user_id, level).await?;
        info!("User {} is now {}", user_id, level);
        Ok(user)
    }

    pub async fn recommendation_for(
        &self,
        machine_id: i64,
        level: TrainingLevel,
    ) -> Result<Option<Recommendation>> {
        get_recommendation(&self.db_pool, machine_id, level).await
    }

    pub async fn recommendations(&self, machine_id: i64) -> Result<Vec<Recommendation>> {
        get_recommendations_for_machine(&self.db_pool, machine_id).await
    }

    pub async fn nutrition_plan(
        &self,
        machine_id: i64,
        level: TrainingLevel,
    ) -> Result<Option<NutritionPlan>> {
        get_nutrition_plan(&self.db_pool, machine_id, level).await
    }

    pub async fn nutrition_levels(&self, machine_id: i64) -> Result<Vec<TrainingLevel>> {
        get_nutrition_plan_levels(&self.db_pool, machine_id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::models::NewMachine;
    use crate::db::operations::{create_machine, create_nutrition_plan, put_recommendation};
    use crate::guidance::{Macros, Meal, NewNutritionPlan, TrainingLevel};
    use crate::reminders::testing::RecordingPlatform;
    use crate::session::Session;
    use std::sync::Arc;

    fn leg_press_plan(level: TrainingLevel) -> NewNutritionPlan {
        NewNutritionPlan {
            level,
            title: format!("{} Leg Press Nutrition Plan", level.label()),
            description: "Balanced nutrition for recovery".into(),
            calories: "2,200-2,500".into(),
            macros: Macros {
                protein: "150-180g (25-30%)".into(),
                carbs: "250-300g (45-50%)".into(),
                fats: "70-90g (25-30%)".into(),
            },
            meals: vec![
                Meal {
                    time: "Breakfast".into(),
                    items: vec!["Oatmeal with banana".into(), "Greek yogurt".into()],
                    calories: "~500".into(),
                },
                Meal {
                    time: "Dinner".into(),
                    items: vec!["Baked salmon".into(), "Quinoa".into()],
                    calories: "~550".into(),
                },
            ],
            tips: vec!["Stay hydrated".into()],
        }
    }

    async fn session_with_leg_press() -> (Session, i64) {
        let session = Session::in_memory(Arc::new(RecordingPlatform::granted()))
            .await
            .unwrap();
        let machine = create_machine(
            &session.db_pool,
            &NewMachine {
                qr_code: "leg-press".into(),
                name: "Leg Press Machine".into(),
                description: None,
                image_url: None,
            },
        )
        .await
        .unwrap();
        // stored out of order on purpose
        for (level, weight, reps) in [
            (TrainingLevel::Advanced, 120.0, "8-10"),
            (TrainingLevel::Beginner, 40.0, "12-15"),
            (TrainingLevel::Intermediate, 80.0, "10-12"),
        ] {
            put_recommendation(&session.db_pool, machine.id, level, weight, reps)
                .await
                .unwrap();
        }
        create_nutrition_plan(
            &session.db_pool,
            machine.id,
            &leg_press_plan(TrainingLevel::Beginner),
        )
        .await
        .unwrap();
        (session, machine.id)
    }

    #[tokio::test]
    async fn recommendation_depends_on_level() {
        let (session, machine_id) = session_with_leg_press().await;

        let advanced = session
            .recommendation_for(machine_id, TrainingLevel::Advanced)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(advanced.weight_kg, 120.0);
        assert_eq!(advanced.reps, "8-10");

        let levels: Vec<_> = session
            .recommendations(machine_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.level)
            .collect();
        assert_eq!(levels, TrainingLevel::ALL.to_vec());
    }

    #[tokio::test]
    async fn recommendation_is_replaced_not_duplicated() {
        let (session, machine_id) = session_with_leg_press().await;

        put_recommendation(&session.db_pool, machine_id, TrainingLevel::Beginner, 45.0, " 12-15 ")
            .await
            .unwrap();

        let all = session.recommendations(machine_id).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].weight_kg, 45.0);
        assert_eq!(all[0].reps, "12-15");
        assert!(
            put_recommendation(&session.db_pool, machine_id, TrainingLevel::Beginner, -5.0, "10")
                .await
                .is_err()
        );
        assert!(
            put_recommendation(&session.db_pool, machine_id, TrainingLevel::Beginner, 5.0, "  ")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn nutrition_plan_keeps_meal_order() {
        let (session, machine_id) = session_with_leg_press().await;

        let plan = session
            .nutrition_plan(machine_id, TrainingLevel::Beginner)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plan.title, "Beginner Leg Press Nutrition Plan");
        let times: Vec<_> = plan.meals.iter().map(|m| m.time.as_str()).collect();
        assert_eq!(times, vec!["Breakfast", "Dinner"]);
        assert_eq!(plan.meals[1].items, vec!["Baked salmon", "Quinoa"]);
        assert_eq!(plan.tips, vec!["Stay hydrated"]);

        assert!(
            session
                .nutrition_plan(machine_id, TrainingLevel::Advanced)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            session.nutrition_levels(machine_id).await.unwrap(),
            vec![TrainingLevel::Beginner]
        );
    }

    #[tokio::test]
    async fn one_plan_per_machine_and_level() {
        let (session, machine_id) = session_with_leg_press().await;

        let duplicate = create_nutrition_plan(
            &session.db_pool,
            machine_id,
            &leg_press_plan(TrainingLevel::Beginner),
        )
        .await;
        assert!(duplicate.is_err());

        // the failed insert left no stray meals behind
        let meals: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nutrition_meals")
            .fetch_one(&session.db_pool)
            .await
            .unwrap();
        assert_eq!(meals, 2);
    }

    #[tokio::test]
    async fn training_level_follows_the_user() {
        let (session, _machine_id) = session_with_leg_press().await;
        assert_eq!(session.training_level().await.unwrap(), TrainingLevel::Beginner);
        assert!(session.set_training_level(TrainingLevel::Advanced).await.is_err());

        session.login("auth-lvl", "lee").await.unwrap();
        assert_eq!(session.training_level().await.unwrap(), TrainingLevel::Beginner);

        let user = session
            .set_training_level(TrainingLevel::Intermediate)
            .await
            .unwrap();
        assert_eq!(user.general_level, "intermediate");
        assert_eq!(
            session.training_level().await.unwrap(),
            TrainingLevel::Intermediate
        );
    }
}
