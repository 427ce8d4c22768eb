use std::env;

use teloxide::types::{ChatId, UserId};

/// Конфигурация бота из переменных окружения (.env поддерживается).
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub database_url: String,
    pub admin_group_chat_id: ChatId,
    pub admin_user_ids: Vec<UserId>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let telegram_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| "TELEGRAM_BOT_TOKEN is not set")?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://clinic.db?mode=rwc".to_string());

        let admin_group_chat_id = env::var("ADMIN_GROUP_CHAT_ID")
            .map_err(|_| "ADMIN_GROUP_CHAT_ID is not set")?
            .parse::<i64>()
            .map_err(|e| format!("invalid ADMIN_GROUP_CHAT_ID: {}", e))?;

        let admins_raw = env::var("ADMIN_USER_IDS").map_err(|_| "ADMIN_USER_IDS is not set")?;
        let mut admin_user_ids = Vec::new();
        for id_str in admins_raw.split(',') {
            let id_str = id_str.trim();
            let id = id_str
                .parse::<u64>()
                .map_err(|_| format!("invalid admin ID: {}", id_str))?;
            admin_user_ids.push(UserId(id));
        }

        Ok(Config {
            telegram_token,
            database_url,
            admin_group_chat_id: ChatId(admin_group_chat_id),
            admin_user_ids,
        })
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_user_ids.contains(&user_id)
    }
}
