use crate::db;
use crate::db::models::User;
use crate::db::operations::get_or_create_user;
use crate::reminders::{NotificationPlatform, ReminderScheduler};
use anyhow::Result;
use log::info;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct Session {
    pub user_id: Mutex<Option<i64>>,
    pub db_pool: SqlitePool,
    pub reminder_scheduler: ReminderScheduler,
}

impl Session {
    pub async fn new(db_path: &str, platform: Arc<dyn NotificationPlatform>) -> Result<Self> {
        let pool = db::connect(db_path).await?;
        Ok(Self::with_pool(pool, platform))
    }

    pub async fn in_memory(platform: Arc<dyn NotificationPlatform>) -> Result<Self> {
        let pool = db::connect_in_memory().await?;
        Ok(Self::with_pool(pool, platform))
    }

    pub fn with_pool(db_pool: SqlitePool, platform: Arc<dyn NotificationPlatform>) -> Self {
        Self {
            user_id: Mutex::new(None),
            db_pool,
            reminder_scheduler: ReminderScheduler::new(platform),
        }
    }

    /// Resolves the signed-in identity to a local user, registering it on first login.
    pub async fn login(&self, auth_uuid: &str, pseudo: &str) -> Result<User> {
        let user = get_or_create_user(&self.db_pool, auth_uuid, pseudo).await?;
        *self.user_id.lock().await = Some(user.id);
        info!("Logged in as user {} ({})", user.id, user.pseudo);
        Ok(user)
    }

    pub async fn logout(&self) {
        *self.user_id.lock().await = None;
    }

    pub async fn get_user_id(&self) -> Option<i64> {
        *self.user_id.lock().await
    }

    pub(crate) async fn require_user_id(&self) -> Result<i64> {
        self.get_user_id()
            .await
            .ok_or_else(|| anyhow::anyhow!("No user logged in"))
    }
}
