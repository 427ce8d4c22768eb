use teloxide::{prelude::*, utils::command::BotCommands};

mod bot_state;
mod config;
mod database;
mod error;
mod handlers;
mod models;
mod scheduling;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::database::Database;
use crate::handlers::{callback_handler, command_handler, message_handler};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "показать помощь")]
    Help,
    #[command(description = "админ: список команд")]
    AdminHelp,
    #[command(description = "админ: все заявки")]
    AdminList,
    #[command(description = "админ: статистика заявок")]
    AdminStats,
    #[command(description = "админ: удалить заявку по ID")]
    AdminDelete(String),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting dental clinic bot...");

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    db.init().await?;
    log::info!("✅ Database initialized");

    let state = BotState::new(db);

    // Фоновая задача для зачистки брошенных сессий
    let state_clone = state.clone();
    tokio::spawn(async move {
        handlers::sweep_sessions_task(state_clone).await;
    });

    let bot = Bot::new(&config.telegram_token);
    log::info!(
        "📦 AdminGroup: {} | Admins: {:?}",
        config.admin_group_chat_id,
        config.admin_user_ids
    );

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state, config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
