use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::database::Database;
use crate::error::BookingError;
use crate::models::{Booking, TimeSlot, WorkingHoursRule};

/// Шаг сетки слотов.
pub const SLOT_MINUTES: i64 = 30;

/// Свободные слоты на дату, строго по возрастанию времени.
///
/// Закрытый или ненастроенный день - пустой список, не ошибка. Слот
/// включается, пока его начало строго раньше закрытия; слот ровно в
/// момент закрытия не предлагается.
pub async fn generate_slots(
    db: &Database,
    date: NaiveDate,
) -> Result<Vec<TimeSlot>, BookingError> {
    let weekday = date.weekday().num_days_from_sunday();
    let rule = match WorkingHoursRule::for_weekday(db, weekday).await? {
        Some(rule) if rule.is_working => rule,
        _ => return Ok(Vec::new()),
    };

    let taken = Booking::booked_times_on(db, date).await?;

    let mut slots = Vec::new();
    let close = date.and_time(rule.end_time);
    let mut current = date.and_time(rule.start_time);
    while current < close {
        if !taken.contains(&current.time()) {
            slots.push(TimeSlot::new(date, current.time()));
        }
        current += Duration::minutes(SLOT_MINUTES);
    }

    Ok(slots)
}

/// Свободен ли точный слот. `OutOfHours`, если время вне рабочего окна
/// либо день закрыт; `Ok(false)`, если слот уже занят.
pub async fn is_free(db: &Database, datetime: NaiveDateTime) -> Result<bool, BookingError> {
    let weekday = datetime.date().weekday().num_days_from_sunday();
    let rule = match WorkingHoursRule::for_weekday(db, weekday).await? {
        Some(rule) if rule.is_working => rule,
        _ => return Err(BookingError::OutOfHours),
    };

    let time = datetime.time();
    if time < rule.start_time || time > rule.end_time {
        return Err(BookingError::OutOfHours);
    }

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE datetime = ?)")
            .bind(datetime)
            .fetch_one(&db.pool)
            .await?;

    Ok(!exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBooking;
    use chrono::NaiveTime;

    // 2024-06-03 - понедельник (09:00-18:00), 2024-06-02 - воскресенье.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn weekday_without_bookings_has_full_grid() {
        let db = Database::open_in_memory().await;

        let slots = generate_slots(&db, monday()).await.unwrap();
        assert_eq!(slots.len(), 18);
        assert_eq!(slots[0].time, at(9, 0));
        assert_eq!(slots[1].time, at(9, 30));
        assert_eq!(slots[17].time, at(17, 30));

        // Строго возрастают, без дубликатов.
        for pair in slots.windows(2) {
            assert!(pair[0].time < pair[1].time);
        }
    }

    #[tokio::test]
    async fn booked_slot_is_excluded() {
        let db = Database::open_in_memory().await;
        Booking::reserve(
            &db,
            &NewBooking {
                name: "Иван".into(),
                phone: "+7900".into(),
                service: "Отбеливание".into(),
                datetime: monday().and_time(at(10, 0)),
            },
        )
        .await
        .unwrap();

        let slots = generate_slots(&db, monday()).await.unwrap();
        assert_eq!(slots.len(), 17);
        assert!(slots.iter().all(|s| s.time != at(10, 0)));

        assert!(!is_free(&db, monday().and_time(at(10, 0))).await.unwrap());
        assert!(is_free(&db, monday().and_time(at(10, 30))).await.unwrap());
    }

    #[tokio::test]
    async fn closed_day_yields_no_slots() {
        let db = Database::open_in_memory().await;
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

        assert!(generate_slots(&db, sunday).await.unwrap().is_empty());

        let err = is_free(&db, sunday.and_time(at(12, 0))).await.unwrap_err();
        assert!(matches!(err, BookingError::OutOfHours));
    }

    #[tokio::test]
    async fn generation_is_idempotent() {
        let db = Database::open_in_memory().await;
        let first = generate_slots(&db, monday()).await.unwrap();
        let second = generate_slots(&db, monday()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn out_of_window_time_is_rejected() {
        let db = Database::open_in_memory().await;

        let err = is_free(&db, monday().and_time(at(8, 30))).await.unwrap_err();
        assert!(matches!(err, BookingError::OutOfHours));

        let err = is_free(&db, monday().and_time(at(19, 0))).await.unwrap_err();
        assert!(matches!(err, BookingError::OutOfHours));
    }
}
