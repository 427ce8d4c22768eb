use std::error::Error;
use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::error::BookingError;
use crate::handlers::utils::{format_admin_notification, main_menu_keyboard, slots_keyboard};
use crate::models::{Booking, TimeSlot};
use crate::scheduling::flow::{self, CommitReply};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: BotState,
    config: Config,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(data) = q.data.clone() else {
        return Ok(());
    };

    if let Some(value) = data.strip_prefix("time:") {
        handle_time_selection(&bot, &q, &state, &config, value).await?;
    } else if let Some(id_str) = data.strip_prefix("delete:") {
        handle_delete(&bot, &q, &state, &config, id_str).await?;
    } else {
        bot.answer_callback_query(q.id.clone())
            .text("Неизвестный callback.")
            .await?;
    }

    Ok(())
}

/// Пользователь нажал кнопку времени. Бронь фиксирует координатор;
/// проигрыш гонки за слот - не сбой, а повод показать свежий список.
async fn handle_time_selection(
    bot: &Bot,
    q: &CallbackQuery,
    state: &BotState,
    config: &Config,
    value: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let Some(picked) = TimeSlot::parse_callback_value(value) else {
        bot.answer_callback_query(q.id.clone())
            .text("Некорректное время.")
            .await?;
        return Ok(());
    };

    let _guard = state.sessions.lock_user(chat_id).await;

    let Some(mut session) = state.sessions.get(chat_id).await else {
        bot.answer_callback_query(q.id.clone())
            .text("Сессия бронирования не найдена.")
            .await?;
        return Ok(());
    };

    match flow::handle_slot(&state.db, &mut session, picked).await {
        Ok(CommitReply::Confirmed { id, booking }) => {
            state.sessions.delete(chat_id).await;
            bot.answer_callback_query(q.id.clone()).await?;

            // Клавиатура слотов больше не актуальна.
            bot.delete_message(chat_id, message_id).await.ok();

            bot.send_message(chat_id, "Спасибо за запись! Заявка сохранена.")
                .reply_markup(main_menu_keyboard())
                .await?;
            log::info!("Booking {} confirmed for chat {}", id, chat_id);

            // Уведомление админ-группе best-effort: его сбой не должен
            // ломать подтверждение пользователю.
            if let Err(e) = bot
                .send_message(config.admin_group_chat_id, format_admin_notification(&booking))
                .await
            {
                log::error!("Failed to notify admin group: {}", e);
            }
        }
        Ok(CommitReply::SlotTaken(slots)) => {
            state.sessions.put(chat_id, session).await;
            bot.answer_callback_query(q.id.clone())
                .text("Это время уже заняли.")
                .await?;
            bot.edit_message_text(
                chat_id,
                message_id,
                "К сожалению, это время уже заняли. Выберите другое:",
            )
            .reply_markup(slots_keyboard(&slots))
            .await?;
        }
        Ok(CommitReply::NoFreeSlots) => {
            state.sessions.put(chat_id, session).await;
            bot.answer_callback_query(q.id.clone()).await?;
            bot.edit_message_text(
                chat_id,
                message_id,
                "На выбранную дату не осталось свободного времени. \
                 Пожалуйста, выберите другую дату (формат: YYYY-MM-DD).",
            )
            .await?;
        }
        Err(BookingError::BadTimeSelection) => {
            bot.answer_callback_query(q.id.clone())
                .text("Этот слот больше недоступен, выберите время из списка.")
                .await?;
        }
        Err(e) => {
            // Сессия не тронута, пользователь может повторить выбор.
            log::error!("Failed to commit booking for chat {}: {}", chat_id, e);
            bot.answer_callback_query(q.id.clone())
                .text("Ошибка при сохранении записи. Попробуйте ещё раз.")
                .await?;
        }
    }

    Ok(())
}

async fn handle_delete(
    bot: &Bot,
    q: &CallbackQuery,
    state: &BotState,
    config: &Config,
    id_str: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !config.is_admin(q.from.id) {
        bot.answer_callback_query(q.id.clone())
            .text("У вас нет прав для этой операции.")
            .await?;
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let Ok(id) = id_str.parse::<i64>() else {
        bot.send_message(chat_id, "Некорректный ID заявки.").await?;
        return Ok(());
    };

    match Booking::delete_by_id(&state.db, id).await {
        Ok(()) => {
            bot.answer_callback_query(q.id.clone())
                .text("Заявка успешно удалена.")
                .await?;
            bot.delete_message(chat_id, message.id()).await.ok();
        }
        Err(BookingError::NotFound) => {
            bot.send_message(chat_id, "Заявка с таким ID не найдена.")
                .await?;
        }
        Err(e) => {
            log::error!("Failed to delete booking {}: {}", id, e);
            bot.send_message(chat_id, "Ошибка удаления заявки.").await?;
        }
    }

    Ok(())
}
