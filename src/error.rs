use std::error::Error;
use std::fmt;

/// Ошибки процесса бронирования.
///
/// `Conflict` — штатный исход при конкурентной записи на один слот,
/// обрабатывается повторным предложением времени, не показывается
/// пользователю как сбой.
#[derive(Debug)]
pub enum BookingError {
    /// Дата не в формате YYYY-MM-DD.
    BadDateFormat,
    /// Выбранный слот не входит в предложенный список.
    BadTimeSelection,
    /// Время вне рабочих часов клиники или день закрыт.
    OutOfHours,
    /// Слот уже занят (уникальный индекс по datetime).
    Conflict,
    /// Заявка с таким ID не существует.
    NotFound,
    /// Недоступность хранилища, транзиентная ошибка.
    Database(String),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::BadDateFormat => write!(f, "invalid date format, expected YYYY-MM-DD"),
            BookingError::BadTimeSelection => write!(f, "selected time is not an offered slot"),
            BookingError::OutOfHours => write!(f, "time is outside working hours"),
            BookingError::Conflict => write!(f, "time slot is already booked"),
            BookingError::NotFound => write!(f, "booking not found"),
            BookingError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl Error for BookingError {}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        // Нарушение уникальности datetime - это конфликт бронирования,
        // а не сбой хранилища.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return BookingError::Conflict;
            }
        }
        BookingError::Database(err.to_string())
    }
}
