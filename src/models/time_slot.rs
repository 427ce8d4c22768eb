use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Кандидат на бронирование: дата плюс время начала с шагом 30 минут.
/// Эфемерное значение, в БД не хранится - в текст форматируется только
/// на границе с Telegram (подпись кнопки, callback data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        TimeSlot { date, time }
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Подпись кнопки: "10:30".
    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// Полное представление для callback data: "2024-06-03 10:30".
    pub fn to_callback_value(&self) -> String {
        self.datetime().format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn parse_callback_value(value: &str) -> Option<Self> {
        let dt = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").ok()?;
        Some(TimeSlot {
            date: dt.date(),
            time: dt.time(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_value_round_trips() {
        let slot = TimeSlot::new(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        );
        let value = slot.to_callback_value();
        assert_eq!(value, "2024-06-03 10:30");
        assert_eq!(TimeSlot::parse_callback_value(&value), Some(slot));
    }

    #[test]
    fn rejects_garbage_callback_value() {
        assert_eq!(TimeSlot::parse_callback_value("03.06.2024 10:30"), None);
        assert_eq!(TimeSlot::parse_callback_value(""), None);
    }
}
