use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;

use crate::error::BookingError;

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, BookingError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    /// Пул с одним соединением поверх sqlite::memory: для тестов.
    #[cfg(test)]
    pub async fn open_in_memory() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = Database { pool };
        db.init().await.unwrap();
        db
    }

    pub async fn init(&self) -> Result<(), BookingError> {
        // Таблица заявок. UNIQUE по datetime - единственный источник
        // истины при конкурентных бронированиях одного слота.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                service TEXT NOT NULL,
                datetime TEXT NOT NULL UNIQUE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Рабочие часы клиники, по одной записи на день недели
        // (0 = воскресенье ... 6 = суббота).
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS working_hours (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                day_of_week INTEGER NOT NULL UNIQUE,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                is_working BOOLEAN NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Часы по умолчанию: будни 09:00-18:00, суббота 10:00-15:00,
        // воскресенье выходной.
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO working_hours (day_of_week, start_time, end_time, is_working)
            VALUES
                (1, '09:00:00', '18:00:00', 1),
                (2, '09:00:00', '18:00:00', 1),
                (3, '09:00:00', '18:00:00', 1),
                (4, '09:00:00', '18:00:00', 1),
                (5, '09:00:00', '18:00:00', 1),
                (6, '10:00:00', '15:00:00', 1),
                (0, '00:00:00', '00:00:00', 0)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings (created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
