use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;
use crate::error::BookingError;

/// Рабочие часы на один день недели (0 = воскресенье ... 6 = суббота).
/// Заполняются один раз при инициализации БД и не меняются в рантайме.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkingHoursRule {
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_working: bool,
}

impl WorkingHoursRule {
    /// Правило для дня недели; `None`, если день не настроен.
    /// Закрытый день (`is_working = false`) возвращается как есть,
    /// трактовка за вызывающим.
    pub async fn for_weekday(db: &Database, weekday: u32) -> Result<Option<Self>, BookingError> {
        let rule = sqlx::query_as::<_, WorkingHoursRule>(
            "SELECT day_of_week, start_time, end_time, is_working
             FROM working_hours
             WHERE day_of_week = ?",
        )
        .bind(weekday as i32)
        .fetch_optional(&db.pool)
        .await?;

        Ok(rule)
    }
}
