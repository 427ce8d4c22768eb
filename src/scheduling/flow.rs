use chrono::NaiveDate;

use crate::database::Database;
use crate::error::BookingError;
use crate::models::{BookingSession, BookingStep, NewBooking, TimeSlot};
use crate::scheduling::{availability, coordinator};

/// Реакция машины состояний на текстовый ввод: что спросить дальше.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowReply {
    AskName,
    AskPhone,
    AskService,
    AskDate,
    /// На выбранную дату нет свободного времени, остаёмся на шаге даты.
    NoFreeSlots,
    OfferSlots(Vec<TimeSlot>),
}

/// Исход подтверждения слота.
#[derive(Debug, Clone)]
pub enum CommitReply {
    /// Заявка сохранена; сессию удаляет вызывающая сторона.
    Confirmed { id: i64, booking: NewBooking },
    /// Слот перехватили, предложен свежий список на ту же дату.
    SlotTaken(Vec<TimeSlot>),
    /// Слот перехватили и свободного времени на дату не осталось,
    /// сессия возвращена на шаг выбора даты.
    NoFreeSlots,
}

/// Продвигает сессию на один шаг по текстовому вводу.
///
/// Невалидный ввод (`BadDateFormat`, пустой текст) не меняет ни шаг,
/// ни собранные поля - пользователь просто переспрашивается.
pub async fn handle_text(
    db: &Database,
    session: &mut BookingSession,
    text: &str,
) -> Result<FlowReply, BookingError> {
    let input = text.trim();

    // Любой обработанный ввод - признак живого диалога, даже если шаг
    // не продвинулся: иначе пользователя, перебирающего даты на
    // занятый день, выселит зачистка простоя.
    session.touch();

    let reply = match session.step.clone() {
        BookingStep::AwaitingName => {
            if input.is_empty() {
                return Ok(FlowReply::AskName);
            }
            session.step = BookingStep::AwaitingPhone {
                name: input.to_string(),
            };
            FlowReply::AskPhone
        }
        BookingStep::AwaitingPhone { name } => {
            if input.is_empty() {
                return Ok(FlowReply::AskPhone);
            }
            session.step = BookingStep::AwaitingService {
                name,
                phone: input.to_string(),
            };
            FlowReply::AskService
        }
        BookingStep::AwaitingService { name, phone } => {
            if input.is_empty() {
                return Ok(FlowReply::AskService);
            }
            session.step = BookingStep::AwaitingDate {
                name,
                phone,
                service: input.to_string(),
            };
            FlowReply::AskDate
        }
        BookingStep::AwaitingDate {
            name,
            phone,
            service,
        } => {
            let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map_err(|_| BookingError::BadDateFormat)?;

            let slots = availability::generate_slots(db, date).await?;
            if slots.is_empty() {
                return Ok(FlowReply::NoFreeSlots);
            }

            session.step = BookingStep::AwaitingTime {
                name,
                phone,
                service,
                date,
                offered: slots.iter().map(|s| s.time).collect(),
            };
            FlowReply::OfferSlots(slots)
        }
        BookingStep::AwaitingTime { date, offered, .. } => {
            // Текст вместо нажатия кнопки: показываем слоты ещё раз.
            FlowReply::OfferSlots(offered.iter().map(|t| TimeSlot::new(date, *t)).collect())
        }
    };

    Ok(reply)
}

/// Подтверждение выбранного слота.
///
/// Принимается только слот из ранее предложенного списка. Гонку за слот
/// разрешает хранилище: на `Conflict` список генерируется заново и
/// пользователь выбирает ещё раз, ошибка ему как сбой не показывается.
pub async fn handle_slot(
    db: &Database,
    session: &mut BookingSession,
    picked: TimeSlot,
) -> Result<CommitReply, BookingError> {
    let BookingStep::AwaitingTime {
        name,
        phone,
        service,
        date,
        offered,
    } = session.step.clone()
    else {
        return Err(BookingError::BadTimeSelection);
    };

    if picked.date != date || !offered.contains(&picked.time) {
        return Err(BookingError::BadTimeSelection);
    }

    let booking = NewBooking {
        name: name.clone(),
        phone: phone.clone(),
        service: service.clone(),
        datetime: picked.datetime(),
    };

    match coordinator::commit(db, &booking).await {
        Ok(id) => Ok(CommitReply::Confirmed { id, booking }),
        Err(BookingError::Conflict) | Err(BookingError::OutOfHours) => {
            let slots = availability::generate_slots(db, date).await?;
            session.touch();
            if slots.is_empty() {
                session.step = BookingStep::AwaitingDate {
                    name,
                    phone,
                    service,
                };
                Ok(CommitReply::NoFreeSlots)
            } else {
                session.step = BookingStep::AwaitingTime {
                    name,
                    phone,
                    service,
                    date,
                    offered: slots.iter().map(|s| s.time).collect(),
                };
                Ok(CommitReply::SlotTaken(slots))
            }
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    async fn session_at_date_step(db: &Database) -> BookingSession {
        let mut session = BookingSession::new();
        handle_text(db, &mut session, "Иван").await.unwrap();
        handle_text(db, &mut session, "+79001234567").await.unwrap();
        handle_text(db, &mut session, "Лечение кариеса").await.unwrap();
        session
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn steps_advance_in_strict_order() {
        let db = Database::open_in_memory().await;
        let mut session = BookingSession::new();

        assert_eq!(
            handle_text(&db, &mut session, "Иван").await.unwrap(),
            FlowReply::AskPhone
        );
        assert_eq!(
            handle_text(&db, &mut session, "+79001234567").await.unwrap(),
            FlowReply::AskService
        );
        assert_eq!(
            handle_text(&db, &mut session, "Чистка").await.unwrap(),
            FlowReply::AskDate
        );

        // 2024-06-03 - понедельник, полная сетка.
        let reply = handle_text(&db, &mut session, "2024-06-03").await.unwrap();
        let FlowReply::OfferSlots(slots) = reply else {
            panic!("expected slot offer");
        };
        assert_eq!(slots.len(), 18);

        let BookingStep::AwaitingTime { ref name, ref offered, .. } = session.step else {
            panic!("expected AwaitingTime");
        };
        assert_eq!(name, "Иван");
        assert_eq!(offered.len(), 18);
    }

    #[tokio::test]
    async fn wrong_date_format_keeps_step_and_fields() {
        let db = Database::open_in_memory().await;
        let mut session = session_at_date_step(&db).await;
        let before = session.step.clone();

        let err = handle_text(&db, &mut session, "03.06.2024").await.unwrap_err();
        assert!(matches!(err, BookingError::BadDateFormat));
        assert_eq!(session.step, before);
    }

    #[tokio::test]
    async fn closed_day_keeps_session_awaiting_date() {
        let db = Database::open_in_memory().await;
        let mut session = session_at_date_step(&db).await;
        let before = session.step.clone();

        // Воскресенье закрыто.
        let reply = handle_text(&db, &mut session, "2024-06-02").await.unwrap();
        assert_eq!(reply, FlowReply::NoFreeSlots);
        assert_eq!(session.step, before);
    }

    #[tokio::test]
    async fn empty_input_reprompts_in_place() {
        let db = Database::open_in_memory().await;
        let mut session = BookingSession::new();

        assert_eq!(
            handle_text(&db, &mut session, "   ").await.unwrap(),
            FlowReply::AskName
        );
        assert_eq!(session.step, BookingStep::AwaitingName);
    }

    #[tokio::test]
    async fn retrying_input_keeps_the_session_fresh() {
        let db = Database::open_in_memory().await;
        let mut session = session_at_date_step(&db).await;
        let stale = chrono::Utc::now() - chrono::Duration::hours(1);

        // Закрытый день: шаг не двигается, но сессия остаётся живой.
        session.updated_at = stale;
        let reply = handle_text(&db, &mut session, "2024-06-02").await.unwrap();
        assert_eq!(reply, FlowReply::NoFreeSlots);
        assert!(session.updated_at > stale);

        // Неверный формат даты тоже продлевает жизнь сессии.
        session.updated_at = stale;
        let err = handle_text(&db, &mut session, "03.06.2024").await.unwrap_err();
        assert!(matches!(err, BookingError::BadDateFormat));
        assert!(session.updated_at > stale);

        // Пустой ввод на первом шаге - то же самое.
        let mut fresh = BookingSession::new();
        fresh.updated_at = stale;
        handle_text(&db, &mut fresh, "   ").await.unwrap();
        assert!(fresh.updated_at > stale);
    }

    #[tokio::test]
    async fn picked_slot_completes_the_booking() {
        let db = Database::open_in_memory().await;
        let mut session = session_at_date_step(&db).await;
        handle_text(&db, &mut session, "2024-06-03").await.unwrap();

        let slot = TimeSlot::new(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), at(10, 0));
        let reply = handle_slot(&db, &mut session, slot).await.unwrap();
        let CommitReply::Confirmed { id, booking } = reply else {
            panic!("expected confirmation");
        };
        assert!(id > 0);
        assert_eq!(booking.name, "Иван");
        assert_eq!(booking.datetime, slot.datetime());
    }

    #[tokio::test]
    async fn slot_not_in_offer_is_rejected_without_state_change() {
        let db = Database::open_in_memory().await;
        let mut session = session_at_date_step(&db).await;
        handle_text(&db, &mut session, "2024-06-03").await.unwrap();
        let before = session.step.clone();

        // 10:15 не лежит на 30-минутной сетке.
        let slot = TimeSlot::new(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), at(10, 15));
        let err = handle_slot(&db, &mut session, slot).await.unwrap_err();
        assert!(matches!(err, BookingError::BadTimeSelection));
        assert_eq!(session.step, before);
    }

    #[tokio::test]
    async fn losing_the_race_reoffers_fresh_slots() {
        let db = Database::open_in_memory().await;
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let slot = TimeSlot::new(date, at(10, 0));

        // Обе сессии дошли до выбора времени и видят 10:00.
        let mut first = session_at_date_step(&db).await;
        handle_text(&db, &mut first, "2024-06-03").await.unwrap();
        let mut second = session_at_date_step(&db).await;
        handle_text(&db, &mut second, "2024-06-03").await.unwrap();

        let winner = handle_slot(&db, &mut first, slot).await.unwrap();
        assert!(matches!(winner, CommitReply::Confirmed { .. }));

        let loser = handle_slot(&db, &mut second, slot).await.unwrap();
        let CommitReply::SlotTaken(slots) = loser else {
            panic!("expected fresh slot offer");
        };
        assert_eq!(slots.len(), 17);
        assert!(slots.iter().all(|s| s.time != at(10, 0)));

        // Проигравшая сессия осталась на выборе времени с новым списком.
        let BookingStep::AwaitingTime { ref offered, .. } = second.step else {
            panic!("expected AwaitingTime");
        };
        assert!(!offered.contains(&at(10, 0)));
    }
}
