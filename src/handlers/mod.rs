pub mod callbacks;
pub mod commands;
pub mod messages;
pub mod utils;

pub use callbacks::callback_handler;
pub use commands::command_handler;
pub use messages::message_handler;

use tokio::time;

use crate::bot_state::BotState;

/// Брошенная сессия считается мёртвой после получаса простоя.
const SESSION_IDLE_MINUTES: i64 = 30;

/// Фоновая зачистка брошенных сессий бронирования.
pub async fn sweep_sessions_task(state: BotState) {
    let mut interval = time::interval(time::Duration::from_secs(60));

    loop {
        interval.tick().await;

        let evicted = state
            .sessions
            .sweep_idle(chrono::Duration::minutes(SESSION_IDLE_MINUTES))
            .await;
        if evicted > 0 {
            log::debug!("🧹 Evicted {} idle booking sessions", evicted);
        }
    }
}
