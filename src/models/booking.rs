use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;
use crate::error::BookingError;

/// Сохранённая заявка на приём.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub service: String,
    pub datetime: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Поля заявки, собранные диалогом, до вставки в БД.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub service: String,
    pub datetime: NaiveDateTime,
}

/// Сводная статистика для /admin_stats.
#[derive(Debug, Clone, Copy)]
pub struct BookingStats {
    pub total: i64,
    pub today: i64,
    pub last_7_days: i64,
}

impl Booking {
    /// Атомарная вставка заявки. Уникальный индекс по datetime
    /// гарантирует, что из двух конкурентных вызовов на один слот
    /// ровно один получит ID, второй - `Conflict`.
    pub async fn reserve(db: &Database, booking: &NewBooking) -> Result<i64, BookingError> {
        let result = sqlx::query(
            "INSERT INTO bookings (name, phone, service, datetime) VALUES (?, ?, ?, ?)",
        )
        .bind(&booking.name)
        .bind(&booking.phone)
        .bind(&booking.service)
        .bind(booking.datetime)
        .execute(&db.pool)
        .await?;

        log::info!("Saved booking at {} for {}", booking.datetime, booking.name);
        Ok(result.last_insert_rowid())
    }

    /// Все заявки, свежие первыми.
    pub async fn all(db: &Database) -> Result<Vec<Self>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, name, phone, service, datetime, created_at
             FROM bookings
             ORDER BY id DESC",
        )
        .fetch_all(&db.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn delete_by_id(db: &Database, id: i64) -> Result<(), BookingError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound);
        }
        Ok(())
    }

    /// Занятое время на указанную дату, по возрастанию.
    pub async fn booked_times_on(
        db: &Database,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, BookingError> {
        let day_start = date.and_time(NaiveTime::MIN);
        let next_day = date
            .checked_add_days(Days::new(1))
            .ok_or(BookingError::BadDateFormat)?
            .and_time(NaiveTime::MIN);

        let taken: Vec<NaiveDateTime> = sqlx::query_scalar(
            "SELECT datetime FROM bookings
             WHERE datetime >= ? AND datetime < ?
             ORDER BY datetime ASC",
        )
        .bind(day_start)
        .bind(next_day)
        .fetch_all(&db.pool)
        .await?;

        Ok(taken.into_iter().map(|dt| dt.time()).collect())
    }

    pub async fn count_created_between(
        db: &Database,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<i64, BookingError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE created_at >= ? AND created_at < ?")
                .bind(start)
                .bind(end)
                .fetch_one(&db.pool)
                .await?;

        Ok(count)
    }

    /// Статистика за сегодня и последние 7 дней относительно `now`.
    pub async fn stats(db: &Database, now: NaiveDateTime) -> Result<BookingStats, BookingError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&db.pool)
            .await?;

        let today_start = now.date().and_time(NaiveTime::MIN);
        let today_end = today_start + chrono::Duration::days(1);
        let today = Self::count_created_between(db, today_start, today_end).await?;

        let week_start = now - chrono::Duration::days(7);
        let last_7_days = Self::count_created_between(db, week_start, today_end).await?;

        Ok(BookingStats {
            total,
            today,
            last_7_days,
        })
    }
}
