//! Wire format for the bidirectional channel.
//!
//! Outbound and structured inbound payloads are a flat JSON object with
//! camelCase fields `id, chatId, text, sender, timestamp`. Anything that
//! does not parse as that shape degrades to the plain-text path; the
//! channel never drops an inbound payload over a parse failure.

use crate::{now_millis, ChatId, Message, MessageId, MessageStatus, WireError};
use serde::{Deserialize, Serialize};

/// Reserved display identity for server free text.
pub const SERVER_SENDER: &str = "Server";

/// The flat key/value payload exchanged with the remote peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePayload {
    /// Message identifier.
    pub id: MessageId,
    /// Conversation identifier.
    pub chat_id: ChatId,
    /// Message body.
    pub text: String,
    /// Display identity of the originator.
    pub sender: String,
    /// Sender-side timestamp. Ignored on reception: the engine assigns the
    /// local reception time instead, since remote clocks are untrusted.
    pub timestamp: i64,
}

impl WirePayload {
    /// Build the outbound payload for a message.
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            chat_id: message.chat_id.clone(),
            text: message.text.clone(),
            sender: message.sender.clone(),
            timestamp: message.timestamp,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Deserialization)
    }

    /// Turn a received structured payload into a message: fields map
    /// directly, `received_at` becomes the timestamp, status is `Sent`.
    pub fn into_message(self, received_at: i64) -> Message {
        Message {
            id: self.id,
            chat_id: self.chat_id,
            text: self.text,
            sender: self.sender,
            timestamp: received_at,
            status: MessageStatus::Sent,
        }
    }
}

/// An inbound payload, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Parsed as the expected message shape.
    Structured(WirePayload),
    /// Plain-text fallback (server free text, or a malformed payload).
    Text(String),
}

impl Inbound {
    /// Classify raw inbound bytes.
    ///
    /// A parse failure on a structured-looking payload is not an error; it
    /// degrades to the text path.
    pub fn classify(bytes: &[u8]) -> Self {
        match WirePayload::from_bytes(bytes) {
            Ok(payload) => Self::Structured(payload),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Normalize this payload into a message, stamped with the local
    /// reception time.
    ///
    /// Plain text carries no chat correlation, so it synthesizes a fresh
    /// random id and chat id and the reserved server identity.
    pub fn into_message(self, received_at: i64) -> Message {
        match self {
            Self::Structured(payload) => payload.into_message(received_at),
            Self::Text(text) => Message {
                id: MessageId::random(),
                chat_id: ChatId::random(),
                text,
                sender: SERVER_SENDER.to_string(),
                timestamp: received_at,
                status: MessageStatus::Sent,
            },
        }
    }

    /// Normalize using the current wall clock.
    pub fn into_message_now(self) -> Message {
        self.into_message(now_millis())
    }
}
