use std::error::Error;
use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::error::BookingError;
use crate::handlers::utils::{
    admin_menu_keyboard, main_menu_keyboard, service_keyboard, slots_keyboard, BTN_BOOK,
    BTN_CONTACTS, BTN_MAIN_MENU, BTN_PRICES, BTN_SERVICES, SERVICES,
};
use crate::models::BookingSession;
use crate::scheduling::flow::{self, FlowReply};

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: BotState,
    config: Config,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        bot.send_message(chat_id, "Пожалуйста, выберите действие из меню.")
            .reply_markup(main_menu_keyboard())
            .await?;
        return Ok(());
    };

    // Известные команды перехватывает command_handler, так что сюда
    // доходят только нераспознанные.
    if text.starts_with('/') {
        bot.send_message(chat_id, "Неизвестная команда.").await?;
        return Ok(());
    }

    // Апдейты одного чата обрабатываются строго по одному,
    // чтобы шаги диалога не перемешивались.
    let _guard = state.sessions.lock_user(chat_id).await;

    match text {
        BTN_BOOK => {
            state.sessions.put(chat_id, BookingSession::new()).await;
            bot.send_message(chat_id, "Как вас зовут?").await?;
            return Ok(());
        }
        BTN_MAIN_MENU => {
            state.sessions.delete(chat_id).await;
            bot.send_message(chat_id, "Выберите действие:")
                .reply_markup(main_menu_keyboard())
                .await?;
            return Ok(());
        }
        BTN_SERVICES => {
            let list = SERVICES
                .iter()
                .map(|s| format!("• {}", s))
                .collect::<Vec<_>>()
                .join("\n");
            bot.send_message(chat_id, format!("📋 Наши услуги:\n\n{}", list))
                .await?;
            return Ok(());
        }
        BTN_PRICES => {
            bot.send_message(
                chat_id,
                "💳 Стоимость зависит от услуги и объёма лечения.\n\
                 Точную цену назовёт врач после осмотра.",
            )
            .await?;
            return Ok(());
        }
        BTN_CONTACTS => {
            bot.send_message(
                chat_id,
                "📞 Телефон регистратуры: +7 (900) 000-00-00\n\
                 Адрес: уточняйте у администратора.",
            )
            .await?;
            return Ok(());
        }
        _ => {}
    }

    if let Some(mut session) = state.sessions.get(chat_id).await {
        match flow::handle_text(&state.db, &mut session, text).await {
            Ok(reply) => {
                state.sessions.put(chat_id, session).await;
                send_flow_reply(&bot, chat_id, reply).await?;
            }
            Err(BookingError::BadDateFormat) => {
                // Шаг и собранные поля не тронуты, переспрашиваем.
                // Сессию кладём обратно ради обновлённого updated_at.
                state.sessions.put(chat_id, session).await;
                bot.send_message(
                    chat_id,
                    "Неверный формат даты. Пожалуйста, используйте формат YYYY-MM-DD",
                )
                .await?;
            }
            Err(e) => {
                log::error!("Booking flow error for chat {}: {}", chat_id, e);
                bot.send_message(
                    chat_id,
                    "Произошла ошибка. Пожалуйста, попробуйте ещё раз.",
                )
                .await?;
            }
        }
        return Ok(());
    }

    // Нет сессии и текст не из меню: показываем подходящее меню.
    let is_admin = msg.from.as_ref().map(|u| config.is_admin(u.id)).unwrap_or(false);
    if is_admin || chat_id == config.admin_group_chat_id {
        bot.send_message(chat_id, "Администратор, пожалуйста, выберите действие:")
            .reply_markup(admin_menu_keyboard())
            .await?;
    } else {
        bot.send_message(
            chat_id,
            "Привет! Это бот стоматологической клиники. Выберите действие:",
        )
        .reply_markup(main_menu_keyboard())
        .await?;
    }

    Ok(())
}

async fn send_flow_reply(
    bot: &Bot,
    chat_id: ChatId,
    reply: FlowReply,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match reply {
        FlowReply::AskName => {
            bot.send_message(chat_id, "Как вас зовут?").await?;
        }
        FlowReply::AskPhone => {
            bot.send_message(chat_id, "Пожалуйста, введите ваш номер телефона:")
                .await?;
        }
        FlowReply::AskService => {
            bot.send_message(chat_id, "Какую услугу вы хотите получить?")
                .reply_markup(service_keyboard())
                .await?;
        }
        FlowReply::AskDate => {
            bot.send_message(
                chat_id,
                "На какую дату вы хотите записаться? (формат: YYYY-MM-DD)",
            )
            .await?;
        }
        FlowReply::NoFreeSlots => {
            bot.send_message(
                chat_id,
                "На выбранную дату нет доступного времени. Пожалуйста, выберите другую дату.",
            )
            .await?;
        }
        FlowReply::OfferSlots(slots) => {
            bot.send_message(chat_id, "Выберите удобное время:")
                .reply_markup(slots_keyboard(&slots))
                .await?;
        }
    }
    Ok(())
}
