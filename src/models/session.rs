use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Шаг диалога бронирования. Каждый вариант несёт только уже собранные
/// поля, поэтому обратиться к телефону или услуге до их ввода нельзя.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BookingStep {
    AwaitingName,
    AwaitingPhone {
        name: String,
    },
    AwaitingService {
        name: String,
        phone: String,
    },
    AwaitingDate {
        name: String,
        phone: String,
        service: String,
    },
    /// Дата выбрана, пользователю показан список слотов. `offered` -
    /// именно те времена, из которых разрешён выбор.
    AwaitingTime {
        name: String,
        phone: String,
        service: String,
        date: NaiveDate,
        offered: Vec<NaiveTime>,
    },
}

/// Сессия диалога одного пользователя. Живёт только в памяти,
/// уничтожается при завершении брони, отмене или по таймауту простоя.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSession {
    pub step: BookingStep,
    pub updated_at: DateTime<Utc>,
}

impl BookingSession {
    pub fn new() -> Self {
        BookingSession {
            step: BookingStep::AwaitingName,
            updated_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for BookingSession {
    fn default() -> Self {
        Self::new()
    }
}
