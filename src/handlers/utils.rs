use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::models::{Booking, NewBooking, TimeSlot};

// Кнопки reply-клавиатур. Сравниваются с текстом входящих сообщений,
// поэтому вынесены в константы.
pub const BTN_BOOK: &str = "🗓️ Записаться на приём";
pub const BTN_SERVICES: &str = "📋 Наши услуги";
pub const BTN_PRICES: &str = "💳 Цены";
pub const BTN_CONTACTS: &str = "📞 Контакты";
pub const BTN_MAIN_MENU: &str = "↩️ Главное меню";

pub const SERVICES: [&str; 6] = [
    "Профессиональная чистка",
    "Лечение кариеса",
    "Протезирование",
    "Имплантация",
    "Отбеливание",
    "Другое",
];

/// Главное меню пациента
pub fn main_menu_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![
            vec![
                KeyboardButton::new(BTN_BOOK),
                KeyboardButton::new(BTN_SERVICES),
            ],
            vec![
                KeyboardButton::new(BTN_PRICES),
                KeyboardButton::new(BTN_CONTACTS),
            ],
        ])
        .resize_keyboard(),
    )
}

/// Меню администратора
pub fn admin_menu_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![
            vec![
                KeyboardButton::new("/admin_list"),
                KeyboardButton::new("/admin_stats"),
            ],
            vec![
                KeyboardButton::new("/admin_help"),
                KeyboardButton::new(BTN_MAIN_MENU),
            ],
        ])
        .resize_keyboard(),
    )
}

/// Выбор услуги (свободный текст тоже принимается)
pub fn service_keyboard() -> ReplyMarkup {
    let rows: Vec<Vec<KeyboardButton>> = SERVICES
        .chunks(2)
        .map(|pair| pair.iter().map(|s| KeyboardButton::new(*s)).collect())
        .collect();
    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard())
}

/// Inline-клавиатура свободных слотов, по три кнопки в ряд.
/// В callback data уходит полное значение "time:YYYY-MM-DD HH:MM",
/// обратно оно разбирается в структурный слот, а не срезается из строки.
pub fn slots_keyboard(slots: &[TimeSlot]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = slots
        .chunks(3)
        .map(|row| {
            row.iter()
                .map(|slot| {
                    InlineKeyboardButton::callback(
                        slot.label(),
                        format!("time:{}", slot.to_callback_value()),
                    )
                })
                .collect()
        })
        .collect();

    InlineKeyboardMarkup::new(rows)
}

/// Кнопка удаления под заявкой в /admin_list
pub fn delete_booking_keyboard(id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "❌ Удалить заявку",
        format!("delete:{}", id),
    )]])
}

pub fn format_booking(booking: &Booking) -> String {
    format!(
        "ID: {}\nИмя: {}\nТелефон: {}\nУслуга: {}\nДата и время: {}",
        booking.id,
        booking.name,
        booking.phone,
        booking.service,
        booking.datetime.format("%Y-%m-%d %H:%M"),
    )
}

/// Текст уведомления в админ-группу о новой записи
pub fn format_admin_notification(booking: &NewBooking) -> String {
    format!(
        "Новая запись на приём:\n\nИмя: {}\nТелефон: {}\nУслуга: {}\nДата и время: {}",
        booking.name,
        booking.phone,
        booking.service,
        booking.datetime.format("%Y-%m-%d %H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn slots_keyboard_encodes_full_datetime() {
        let slot = TimeSlot::new(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        let keyboard = slots_keyboard(&[slot]);
        let button = &keyboard.inline_keyboard[0][0];
        assert_eq!(button.text, "10:00");
        match &button.kind {
            teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(data, "time:2024-06-03 10:00");
            }
            other => panic!("unexpected button kind: {:?}", other),
        }
    }

    #[test]
    fn booking_formats_to_minute_precision() {
        let booking = NewBooking {
            name: "Иван".into(),
            phone: "+7900".into(),
            service: "Чистка".into(),
            datetime: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
        };
        let text = format_admin_notification(&booking);
        assert!(text.contains("2024-06-03 10:00"));
        assert!(text.contains("Иван"));
    }
}
