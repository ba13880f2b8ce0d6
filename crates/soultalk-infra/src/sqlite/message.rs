//! SQLite history store implementation.
//!
//! Implements `HistoryStore` from `soultalk-core`. Messages are ordered by
//! `created_at`, with the `seq` autoincrement column breaking ties in
//! insertion order.

use soultalk_core::chat::repository::HistoryStore;
use soultalk_types::chat::{Message, ReplyTurn};
use soultalk_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::session::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `HistoryStore`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    session_id: String,
    owner: String,
    user_message: String,
    audio_ref: Option<String>,
    emotion: Option<String>,
    confidence: Option<f64>,
    bot_reply: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            owner: row.try_get("owner")?,
            user_message: row.try_get("user_message")?,
            audio_ref: row.try_get("audio_ref")?,
            emotion: row.try_get("emotion")?,
            confidence: row.try_get("confidence")?,
            bot_reply: row.try_get("bot_reply")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;

        Ok(Message {
            id,
            session_id,
            owner: self.owner,
            user_message: self.user_message,
            audio_ref: self.audio_ref,
            emotion: self.emotion,
            confidence: self.confidence,
            bot_reply: self.bot_reply,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl HistoryStore for SqliteMessageRepository {
    async fn append(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, session_id, owner, user_message, audio_ref, emotion, confidence, bot_reply, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(&message.owner)
        .bind(&message.user_message)
        .bind(&message.audio_ref)
        .bind(&message.emotion)
        .bind(message.confidence)
        .bind(&message.bot_reply)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_for_reply(&self, session_id: &Uuid) -> Result<Vec<ReplyTurn>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT user_message, bot_reply FROM messages
               WHERE session_id = ?
               ORDER BY created_at ASC, seq ASC"#,
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| -> Result<ReplyTurn, RepositoryError> {
                Ok(ReplyTurn {
                    user_message: row
                        .try_get("user_message")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    bot_reply: row
                        .try_get("bot_reply")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                })
            })
            .collect()
    }

    async fn list_full(&self, session_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE session_id = ? ORDER BY created_at ASC, seq ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }

    async fn delete_all(&self, session_id: &Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u32)
    }
}
