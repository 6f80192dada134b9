//! # chat-engine
//!
//! Client-side message synchronization engine for offline-tolerant chat.
//!
//! The engine keeps a durable local record of conversations consistent with
//! messages arriving over an unreliable channel, and guarantees that
//! messages composed while offline are delivered once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! Application → SyncEngine → ChannelAdapter → Transport → Network
//!                   ↓
//!             chat-store (durable messages)
//!             chat-core  (pure gate + summary logic)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use chat_engine::{EngineConfig, MockTransport, SyncEngine};
//! use chat_store::SqliteStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::new("chat.db".as_ref()).await?);
//! let engine = SyncEngine::start(EngineConfig::default(), transport, store).await?;
//!
//! let outcome = engine.submit("hello", "You", None).await?;
//! let chats = engine.observe_chat_summaries();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod engine;
mod error;
pub mod transport;

pub use channel::{ChannelAdapter, ChannelError};
pub use config::{ConfigError, EngineConfig};
pub use engine::{SendOutcome, SyncEngine};
pub use error::EngineError;
pub use transport::{MockTransport, Transport, TransportError};
