use std::error::Error;
use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::error::BookingError;
use crate::handlers::utils::{admin_menu_keyboard, delete_booking_keyboard, format_booking, main_menu_keyboard};
use crate::models::Booking;
use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
    config: Config,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let is_admin = msg.from.as_ref().map(|u| config.is_admin(u.id)).unwrap_or(false);

    match cmd {
        Command::Start => handle_start(bot, msg, state, is_admin).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::AdminHelp => handle_admin_help(bot, msg, is_admin).await?,
        Command::AdminList => handle_admin_list(bot, msg, state, is_admin).await?,
        Command::AdminStats => handle_admin_stats(bot, msg, state, is_admin).await?,
        Command::AdminDelete(args) => handle_admin_delete(bot, msg, state, is_admin, args).await?,
    }
    Ok(())
}

async fn handle_start(
    bot: Bot,
    msg: Message,
    state: BotState,
    is_admin: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // /start сбрасывает начатое бронирование.
    state.sessions.delete(msg.chat.id).await;

    if is_admin {
        bot.send_message(msg.chat.id, "Администратор, пожалуйста, выберите действие:")
            .reply_markup(admin_menu_keyboard())
            .await?;
    } else {
        bot.send_message(
            msg.chat.id,
            "Привет! Это бот стоматологической клиники. Выберите действие:",
        )
        .reply_markup(main_menu_keyboard())
        .await?;
    }
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> Result<(), Box<dyn Error + Send + Sync>> {
    bot.send_message(
        msg.chat.id,
        "Я помогу записаться на приём в клинику.\n\n\
         Нажмите «🗓️ Записаться на приём» и ответьте на вопросы: имя, \
         телефон, услуга, дата. После этого выберите свободное время из \
         списка.\n\n\
         /start — главное меню\n\
         /help — это сообщение",
    )
    .reply_markup(main_menu_keyboard())
    .await?;
    Ok(())
}

async fn handle_admin_help(
    bot: Bot,
    msg: Message,
    is_admin: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !is_admin {
        bot.send_message(msg.chat.id, "У вас нет прав для этой команды.")
            .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        "Доступные админ-команды:\n\n\
         /admin_list — Показать все заявки\n\
         /admin_stats — Показать статистику\n\
         /admin_delete N — Удалить заявку по ID\n\
         /admin_help — Показать это сообщение",
    )
    .await?;
    Ok(())
}

async fn handle_admin_list(
    bot: Bot,
    msg: Message,
    state: BotState,
    is_admin: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !is_admin {
        bot.send_message(msg.chat.id, "У вас нет прав для этой команды.")
            .await?;
        return Ok(());
    }

    let bookings = match Booking::all(&state.db).await {
        Ok(bookings) => bookings,
        Err(e) => {
            log::error!("Failed to list bookings: {}", e);
            bot.send_message(msg.chat.id, "Ошибка получения заявок.")
                .await?;
            return Ok(());
        }
    };

    if bookings.is_empty() {
        bot.send_message(msg.chat.id, "Заявок пока нет.").await?;
        return Ok(());
    }

    for booking in &bookings {
        bot.send_message(msg.chat.id, format_booking(booking))
            .reply_markup(delete_booking_keyboard(booking.id))
            .await?;
    }
    Ok(())
}

async fn handle_admin_stats(
    bot: Bot,
    msg: Message,
    state: BotState,
    is_admin: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !is_admin {
        bot.send_message(msg.chat.id, "У вас нет прав для этой команды.")
            .await?;
        return Ok(());
    }

    match Booking::stats(&state.db, chrono::Utc::now().naive_utc()).await {
        Ok(stats) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "📊 Статистика заявок:\n\n\
                     Всего заявок: {}\n\
                     Заявок сегодня: {}\n\
                     Заявок за последние 7 дней: {}",
                    stats.total, stats.today, stats.last_7_days,
                ),
            )
            .await?;
        }
        Err(e) => {
            log::error!("Failed to compute booking stats: {}", e);
            bot.send_message(msg.chat.id, "Ошибка получения статистики.")
                .await?;
        }
    }
    Ok(())
}

async fn handle_admin_delete(
    bot: Bot,
    msg: Message,
    state: BotState,
    is_admin: bool,
    args: String,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !is_admin {
        bot.send_message(msg.chat.id, "У вас нет прав для этой команды.")
            .await?;
        return Ok(());
    }

    let Ok(id) = args.trim().parse::<i64>() else {
        bot.send_message(
            msg.chat.id,
            "Пожалуйста, укажите корректный ID заявки: /admin_delete 123",
        )
        .await?;
        return Ok(());
    };

    match Booking::delete_by_id(&state.db, id).await {
        Ok(()) => {
            bot.send_message(msg.chat.id, "Заявка успешно удалена.")
                .await?;
        }
        Err(BookingError::NotFound) => {
            bot.send_message(msg.chat.id, "Заявка с таким ID не найдена.")
                .await?;
        }
        Err(e) => {
            log::error!("Failed to delete booking {}: {}", id, e);
            bot.send_message(msg.chat.id, "Ошибка удаления заявки.")
                .await?;
        }
    }
    Ok(())
}
