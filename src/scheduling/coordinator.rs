use crate::database::Database;
use crate::error::BookingError;
use crate::models::{Booking, NewBooking};
use crate::scheduling::availability;

/// Единственная точка фиксации брони.
///
/// Список слотов к моменту подтверждения мог устареть, поэтому рабочие
/// часы перепроверяются здесь, а сам конфликт разрешает уникальный
/// индекс в `Booking::reserve`: из двух конкурентных попыток на один
/// слот ровно одна вернёт ID, вторая - `Conflict`.
pub async fn commit(db: &Database, booking: &NewBooking) -> Result<i64, BookingError> {
    // Проверка занятости здесь не делается: ответ `is_free` носил бы
    // рекомендательный характер, решает только вставка.
    availability::is_free(db, booking.datetime).await?;

    Booking::reserve(db, booking).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn booking(h: u32, m: u32) -> NewBooking {
        NewBooking {
            name: "Мария".into(),
            phone: "+7911".into(),
            service: "Имплантация".into(),
            datetime: NaiveDate::from_ymd_opt(2024, 6, 4)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn commit_reserves_an_open_slot() {
        let db = Database::open_in_memory().await;
        let id = commit(&db, &booking(11, 0)).await.unwrap();
        assert!(id > 0);
    }

    #[tokio::test]
    async fn second_commit_for_same_slot_is_conflict() {
        let db = Database::open_in_memory().await;
        commit(&db, &booking(11, 0)).await.unwrap();

        let err = commit(&db, &booking(11, 0)).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict));
    }

    #[tokio::test]
    async fn commit_outside_working_hours_is_rejected() {
        let db = Database::open_in_memory().await;
        let err = commit(&db, &booking(23, 0)).await.unwrap_err();
        assert!(matches!(err, BookingError::OutOfHours));
    }
}
