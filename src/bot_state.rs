use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use teloxide::types::ChatId;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::database::Database;
use crate::models::BookingSession;

/// Общее состояние бота, передаётся в обработчики через dptree.
#[derive(Clone)]
pub struct BotState {
    pub db: Database,
    pub sessions: SessionStore,
}

impl BotState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
        }
    }
}

/// In-memory хранилище сессий бронирования, не больше одной на чат.
///
/// Карта сессий защищена RwLock, который держится только на время
/// одиночной операции get/put/delete. Апдейты одного пользователя
/// сериализуются отдельным замком `lock_user`, так что обращение к БД
/// внутри шага не блокирует чужие сессии.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<ChatId, BookingSession>>>,
    user_locks: Arc<RwLock<HashMap<ChatId, Arc<Mutex<()>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Замок на пользователя: пока гард жив, апдейты этого чата
    /// обрабатываются строго по одному.
    pub async fn lock_user(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.user_locks.write().await;
            locks
                .entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<BookingSession> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    pub async fn put(&self, chat_id: ChatId, session: BookingSession) {
        self.sessions.write().await.insert(chat_id, session);
    }

    pub async fn delete(&self, chat_id: ChatId) {
        self.sessions.write().await.remove(&chat_id);
    }

    /// Выбрасывает брошенные сессии, не трогавшиеся дольше `max_idle`,
    /// и чистит замки пользователей без сессий. Возвращает число
    /// удалённых сессий.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.updated_at > cutoff);
        let evicted = before - sessions.len();

        let mut locks = self.user_locks.write().await;
        locks.retain(|chat_id, lock| {
            sessions.contains_key(chat_id) || Arc::strong_count(lock) > 1
        });

        evicted
    }
}
