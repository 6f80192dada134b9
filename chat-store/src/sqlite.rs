//! SQLite storage backend for chat-store.

use crate::{MessageStore, StoreError};
use async_trait::async_trait;
use chat_types::{ChatId, Message, MessageId, MessageStatus};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::watch;

/// SQLite-based message storage.
///
/// Uses WAL mode for concurrent reads/writes. Carries a generation counter
/// on a watch channel so live views can re-query after every mutation.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    changes: std::sync::Arc<watch::Sender<u64>>,
}

impl SqliteStore {
    /// Create a new SQLite store from a database path.
    ///
    /// Creates the database file if it doesn't exist.
    pub async fn new(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .map_err(StoreError::Database)?;

        Self::with_pool(pool).await
    }

    /// Create an in-memory SQLite store (for testing).
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(":memory:")
            .map_err(StoreError::Database)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(StoreError::Database)?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let (changes, _) = watch::channel(0);
        let store = Self {
            pool,
            changes: std::sync::Arc::new(changes),
        };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT NOT NULL,
                chat_id TEXT NOT NULL,
                text TEXT NOT NULL,
                sender TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (id, chat_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_chat_ts ON messages(chat_id, timestamp)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_status ON messages(status)")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        Ok(())
    }

    /// Bump the generation counter after a successful mutation.
    fn notify_changed(&self) {
        self.changes.send_modify(|generation| *generation += 1);
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn upsert(&self, message: &Message) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, chat_id, text, sender, timestamp, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id, chat_id) DO UPDATE SET
                text = excluded.text,
                sender = excluded.sender,
                timestamp = excluded.timestamp,
                status = excluded.status
            "#,
        )
        .bind(message.id.as_str())
        .bind(message.chat_id.as_str())
        .bind(&message.text)
        .bind(&message.sender)
        .bind(message.timestamp)
        .bind(message.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        self.notify_changed();
        Ok(())
    }

    async fn update_status(
        &self,
        id: &MessageId,
        chat_id: &ChatId,
        status: MessageStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET status = ?1 WHERE id = ?2 AND chat_id = ?3
            "#,
        )
        .bind(status.as_str())
        .bind(id.as_str())
        .bind(chat_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        // A vanished row is not an error; the update is simply stale.
        if result.rows_affected() == 0 {
            tracing::debug!(%id, %chat_id, "status update targeted a missing record");
            return Ok(());
        }

        self.notify_changed();
        Ok(())
    }

    async fn by_status(&self, status: MessageStatus) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, chat_id, text, sender, timestamp, status
            FROM messages
            WHERE status = ?1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }

    async fn messages_for_chat(&self, chat_id: &ChatId) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, chat_id, text, sender, timestamp, status
            FROM messages
            WHERE chat_id = ?1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(chat_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }

    async fn latest_per_chat(&self) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, chat_id, text, sender, timestamp, status
            FROM (
                SELECT m.*,
                       ROW_NUMBER() OVER (
                           PARTITION BY chat_id
                           ORDER BY timestamp DESC, id DESC
                       ) AS rn
                FROM messages m
            )
            WHERE rn = 1
            ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM messages")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Database)?;

        self.notify_changed();
        Ok(())
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

/// Internal row type for SQLite queries.
#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    chat_id: String,
    text: String,
    sender: String,
    timestamp: i64,
    status: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let status = MessageStatus::parse(&row.status).ok_or(StoreError::CorruptStatus {
            status: row.status,
        })?;
        Ok(Message {
            id: MessageId::from(row.id),
            chat_id: ChatId::from(row.chat_id),
            text: row.text,
            sender: row.sender,
            timestamp: row.timestamp,
            status,
        })
    }
}
