//! # chat-store
//!
//! Durable message storage for the chat-sync engine.
//!
//! The store exclusively owns durable [`Message`] records, keyed by
//! `(id, chat_id)`. Every other component accesses persistence only
//! through the narrow [`MessageStore`] trait; nothing reads or writes the
//! underlying database directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod sqlite;
mod stream;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
pub use stream::{ChatStream, LatestStream};

use async_trait::async_trait;
use chat_types::{ChatId, Message, MessageId, MessageStatus};
use tokio::sync::watch;

/// Trait for message storage backends.
///
/// All operations may suspend pending I/O; none blocks the caller's thread.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert-or-replace by `(id, chat_id)`.
    ///
    /// No error on a duplicate key: this is the idempotency primitive used
    /// by retries and by inbound re-delivery.
    async fn upsert(&self, message: &Message) -> Result<(), StoreError>;

    /// Update the status of a stored message.
    ///
    /// A no-op if the record no longer exists: a retry racing a clear-all
    /// or deletion must not raise.
    async fn update_status(
        &self,
        id: &MessageId,
        chat_id: &ChatId,
        status: MessageStatus,
    ) -> Result<(), StoreError>;

    /// All messages with the given status, in stable (timestamp, id) order.
    async fn by_status(&self, status: MessageStatus) -> Result<Vec<Message>, StoreError>;

    /// All messages for a chat, ascending by timestamp.
    async fn messages_for_chat(&self, chat_id: &ChatId) -> Result<Vec<Message>, StoreError>;

    /// One message per chat: the one with the maximum timestamp, ordered
    /// newest chat first.
    async fn latest_per_chat(&self) -> Result<Vec<Message>, StoreError>;

    /// Remove all records. Maintenance/testing only.
    async fn clear_all(&self) -> Result<(), StoreError>;

    /// Change signal: a generation counter bumped after every mutation.
    ///
    /// Level-triggered consumers ([`ChatStream`], [`LatestStream`]) wait on
    /// this and re-query the full result set.
    fn changes(&self) -> watch::Receiver<u64>;
}
