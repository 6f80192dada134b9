//! The synchronization engine: reconciliation, retry, and summary
//! maintenance.
//!
//! The engine is the only stateful decision-maker. It owns the transient
//! in-memory state (summary cache, open-chat selection, in-flight
//! optimistic sends) behind one lock; concurrent tasks - inbound
//! reconciliation, outbound submit, queue drain, connectivity handling -
//! serialize their mutations through it. Everything in that state is
//! re-derivable from the message store plus pending in-flight sends; the
//! store stays the single source of truth.
//!
//! Observable views are published through `tokio::sync::watch` channels:
//! the chat summary list (descending timestamp, one entry per chat) and
//! the currently open chat's message list (ascending timestamp).

use crate::channel::{ChannelAdapter, ChannelError};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::transport::Transport;
use chat_core::{ConnectivityGate, SummaryList};
use chat_store::{ChatStream, LatestStream, MessageStore};
use chat_types::{Chat, ChatId, Inbound, Message, MessageStatus, WirePayload};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Result of a send request.
///
/// Queueing is an informational outcome, distinct from a hard failure:
/// the message is durable and will be redelivered on reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The transport accepted the write.
    Delivered,
    /// The transport was unavailable; the message is persisted as queued.
    Queued,
}

/// Transient engine state, guarded by one lock.
struct EngineState {
    /// Summary ordering cache, re-derivable from `latest_per_chat`.
    summary: SummaryList,
    /// The currently selected conversation, if any.
    open_chat: Option<ChatId>,
    /// Delivered-or-pending outbound messages not (yet) in the store.
    in_flight: Vec<Message>,
    /// Last-known connectivity with edge detection.
    gate: ConnectivityGate,
}

struct EngineShared<T: Transport> {
    store: Arc<dyn MessageStore>,
    channel: ChannelAdapter<T>,
    state: Mutex<EngineState>,
    chats_tx: watch::Sender<Vec<Chat>>,
    messages_tx: watch::Sender<Vec<Message>>,
    open_tx: watch::Sender<Option<ChatId>>,
    shutdown_tx: watch::Sender<bool>,
}

/// The message synchronization engine.
pub struct SyncEngine<T: Transport> {
    shared: Arc<EngineShared<T>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Transport + 'static> SyncEngine<T> {
    /// Connect the channel, seed the views from the store, and spawn the
    /// background reconciliation and projection tasks.
    pub async fn start(
        config: EngineConfig,
        transport: T,
        store: Arc<dyn MessageStore>,
    ) -> Result<Self, EngineError> {
        let channel = ChannelAdapter::new(transport);
        channel.connect(&config.server_address).await;

        let latest = store.latest_per_chat().await?;
        let summary = SummaryList::from_latest(&latest);

        let (chats_tx, _) = watch::channel(summary.to_vec());
        let (messages_tx, _) = watch::channel(Vec::new());
        let (open_tx, _) = watch::channel(None);
        let (shutdown_tx, _) = watch::channel(false);

        let shared = Arc::new(EngineShared {
            store,
            channel,
            state: Mutex::new(EngineState {
                summary,
                open_chat: None,
                in_flight: Vec::new(),
                gate: ConnectivityGate::new(),
            }),
            chats_tx,
            messages_tx,
            open_tx,
            shutdown_tx,
        });

        let tasks = vec![
            tokio::spawn(inbound_loop(Arc::clone(&shared))),
            tokio::spawn(summary_loop(Arc::clone(&shared))),
            tokio::spawn(open_chat_loop(Arc::clone(&shared))),
        ];

        Ok(Self {
            shared,
            tasks: Mutex::new(tasks),
        })
    }

    /// Live view of the chat summaries, newest chat first.
    pub fn observe_chat_summaries(&self) -> watch::Receiver<Vec<Chat>> {
        self.shared.chats_tx.subscribe()
    }

    /// Select a chat and get a live view of its messages, oldest first.
    ///
    /// Only one chat is open at a time; a later call switches the view.
    pub async fn observe_messages(&self, chat_id: ChatId) -> watch::Receiver<Vec<Message>> {
        {
            let mut state = self.shared.state.lock().await;
            state.open_chat = Some(chat_id.clone());
        }
        self.shared.open_tx.send_replace(Some(chat_id));
        self.shared.messages_tx.subscribe()
    }

    /// Submit an outbound message.
    ///
    /// The message is published optimistically into the open chat's view
    /// before any I/O. Delivery is attempted immediately; on transport
    /// failure the message is persisted as queued and the queued outcome
    /// is returned - not an error.
    ///
    /// With no explicit `chat_id`, the message targets the currently open
    /// chat, or a fresh conversation if none is open.
    pub async fn submit(
        &self,
        text: impl Into<String>,
        sender: impl Into<String>,
        chat_id: Option<ChatId>,
    ) -> Result<SendOutcome, EngineError> {
        let (message, in_open_chat) = {
            let mut state = self.shared.state.lock().await;
            let chat_id = chat_id
                .or_else(|| state.open_chat.clone())
                .unwrap_or_else(ChatId::random);
            let message = Message::outbound(text, sender, chat_id);
            let in_open_chat = state.open_chat.as_ref() == Some(&message.chat_id);
            if in_open_chat {
                state.in_flight.push(message.clone());
            }
            (message, in_open_chat)
        };

        if in_open_chat {
            // Optimistic view update, before the send completes.
            match self.shared.store.messages_for_chat(&message.chat_id).await {
                Ok(stored) => self.shared.publish_open_view(stored).await,
                Err(err) => tracing::error!(%err, "optimistic view refresh failed"),
            }
        }

        let payload = WirePayload::from_message(&message);
        match self.shared.channel.send(&payload).await {
            Ok(()) => {
                tracing::debug!(id = %message.id, chat = %message.chat_id, "message delivered");
                Ok(SendOutcome::Delivered)
            }
            Err(ChannelError::Encode(err)) => {
                let mut state = self.shared.state.lock().await;
                state.in_flight.retain(|m| m.id != message.id);
                Err(EngineError::Wire(err))
            }
            Err(err) => {
                tracing::debug!(id = %message.id, %err, "delivery failed, queueing");
                let queued = message.with_status(MessageStatus::Queued);
                let persisted = self.shared.store.upsert(&queued).await;
                {
                    // Durable now (or lost to a store failure); either way
                    // it no longer belongs in the in-flight list.
                    let mut state = self.shared.state.lock().await;
                    state.in_flight.retain(|m| m.id != queued.id);
                }
                persisted?;
                Ok(SendOutcome::Queued)
            }
        }
    }

    /// One drain pass: redeliver all currently queued messages, in turn.
    ///
    /// Failures are isolated per message and never propagate: a message
    /// that still cannot be delivered simply stays queued for the next
    /// pass.
    pub async fn retry_queued(&self) {
        let queued = match self.shared.store.by_status(MessageStatus::Queued).await {
            Ok(queued) => queued,
            Err(err) => {
                tracing::error!(%err, "could not load queued messages for drain");
                return;
            }
        };
        if queued.is_empty() {
            return;
        }

        tracing::debug!(count = queued.len(), "drain pass starting");
        for message in queued {
            let payload = WirePayload::from_message(&message);
            match self.shared.channel.send(&payload).await {
                Ok(()) => {
                    if let Err(err) = self
                        .shared
                        .store
                        .update_status(&message.id, &message.chat_id, MessageStatus::Sent)
                        .await
                    {
                        tracing::warn!(id = %message.id, %err, "delivered but status update failed");
                    }
                }
                Err(err) => {
                    tracing::debug!(id = %message.id, %err, "still queued");
                }
            }
        }
    }

    /// Feed a connectivity update into the gate.
    ///
    /// Exactly one drain pass runs on the offline-to-online transition;
    /// repeated "online" updates are ignored.
    pub async fn set_connectivity(&self, connected: bool) {
        let drain = {
            let mut state = self.shared.state.lock().await;
            state.gate.update(connected)
        };
        if drain {
            tracing::debug!("connectivity restored, draining queued messages");
            self.retry_queued().await;
        }
    }

    /// Last-known connectivity, as seen by the gate.
    pub async fn is_connected(&self) -> bool {
        let state = self.shared.state.lock().await;
        state.gate.is_connected()
    }

    /// Stop the background tasks and close the channel.
    ///
    /// After this returns no further store writes happen.
    pub async fn shutdown(&self) {
        self.shared.shutdown_tx.send_replace(true);
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            let _ = task.await;
        }
        self.shared.channel.disconnect().await;
    }
}

impl<T: Transport> EngineShared<T> {
    /// Reconcile one inbound payload: normalize, persist, fold into the
    /// summary cache.
    async fn reconcile(&self, inbound: Inbound) {
        let message = inbound.into_message_now();
        tracing::debug!(id = %message.id, chat = %message.chat_id, "reconciling inbound message");

        if let Err(err) = self.store.upsert(&message).await {
            tracing::error!(%err, "failed to persist inbound message");
            return;
        }

        // Full deterministic resort, not an incremental patch; the open
        // chat's list follows through the store's change signal.
        let mut state = self.state.lock().await;
        state.summary.apply(&message);
        self.chats_tx.send_replace(state.summary.to_vec());
    }

    /// Publish the open chat's view: stored messages merged with in-flight
    /// sends, ascending by timestamp.
    async fn publish_open_view(&self, stored: Vec<Message>) {
        let state = self.state.lock().await;
        let mut merged = stored;
        if let Some(open) = &state.open_chat {
            for message in &state.in_flight {
                if &message.chat_id == open && !merged.iter().any(|m| m.id == message.id) {
                    merged.push(message.clone());
                }
            }
        }
        merged.sort_by(|a, b| (a.timestamp, &a.id).cmp(&(b.timestamp, &b.id)));
        self.messages_tx.send_replace(merged);
    }
}

/// Consume the channel's inbound sequence until shutdown or close.
async fn inbound_loop<T: Transport + 'static>(shared: Arc<EngineShared<T>>) {
    let mut shutdown = shared.shutdown_tx.subscribe();
    loop {
        let inbound = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            inbound = shared.channel.next_inbound() => inbound,
        };
        match inbound {
            Ok(payload) => shared.reconcile(payload).await,
            Err(ChannelError::Closed) => {
                tracing::debug!("inbound channel closed");
                break;
            }
            Err(err) => {
                tracing::warn!(%err, "inbound receive failed");
            }
        }
    }
}

/// Re-derive the summary cache from the store on every change.
///
/// The cache updated eagerly by reconciliation converges to the same
/// content; this keeps it honest against writes that bypass the inbound
/// path (queued sends, drains, clears).
async fn summary_loop<T: Transport + 'static>(shared: Arc<EngineShared<T>>) {
    let mut shutdown = shared.shutdown_tx.subscribe();
    let mut latest = LatestStream::new(Arc::clone(&shared.store));
    loop {
        let batch = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            batch = latest.next() => batch,
        };
        match batch {
            Ok(messages) => {
                let mut state = shared.state.lock().await;
                state.summary = SummaryList::from_latest(&messages);
                shared.chats_tx.send_replace(state.summary.to_vec());
            }
            Err(err) => tracing::error!(%err, "summary projection query failed"),
        }
    }
}

/// Follow the open chat selection and republish its message list on every
/// store change.
async fn open_chat_loop<T: Transport + 'static>(shared: Arc<EngineShared<T>>) {
    let mut shutdown = shared.shutdown_tx.subscribe();
    let mut open_rx = shared.open_tx.subscribe();
    let mut stream: Option<ChatStream> = None;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            changed = open_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let selected = open_rx.borrow_and_update().clone();
                stream = selected.map(|chat_id| {
                    ChatStream::new(Arc::clone(&shared.store), chat_id)
                });
            }
            snapshot = async { stream.as_mut().unwrap().next().await }, if stream.is_some() => {
                match snapshot {
                    Ok(messages) => shared.publish_open_view(messages).await,
                    Err(err) => tracing::error!(%err, "open chat projection query failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use chat_store::SqliteStore;
    use chat_types::{MessageId, SERVER_SENDER};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    async fn start_engine() -> (SyncEngine<MockTransport>, MockTransport, Arc<dyn MessageStore>) {
        let transport = MockTransport::new();
        let store: Arc<dyn MessageStore> = Arc::new(SqliteStore::in_memory().await.unwrap());
        let engine = SyncEngine::start(
            EngineConfig::default(),
            transport.clone(),
            Arc::clone(&store),
        )
        .await
        .unwrap();
        (engine, transport, store)
    }

    /// Wait until the watched value satisfies the predicate.
    async fn wait_for<V>(rx: &mut watch::Receiver<V>, mut pred: impl FnMut(&V) -> bool) {
        for _ in 0..50 {
            if pred(&rx.borrow()) {
                return;
            }
            timeout(Duration::from_secs(1), rx.changed())
                .await
                .expect("view did not update in time")
                .unwrap();
        }
        panic!("condition never reached");
    }

    fn structured(id: &str, chat: &str, text: &str) -> Vec<u8> {
        format!(
            r#"{{"id":"{id}","chatId":"{chat}","text":"{text}","sender":"peer","timestamp":0}}"#
        )
        .into_bytes()
    }

    fn queued_msg(id: &str, chat: &str, text: &str, timestamp: i64) -> Message {
        Message {
            id: MessageId::from(id),
            chat_id: ChatId::from(chat),
            text: text.to_string(),
            sender: "You".to_string(),
            timestamp,
            status: MessageStatus::Queued,
        }
    }

    // ===========================================
    // Outbound Submit Tests
    // ===========================================

    #[tokio::test]
    async fn submit_while_online_is_delivered() {
        let (engine, transport, store) = start_engine().await;

        let outcome = engine
            .submit("hi", "You", Some(ChatId::from("c1")))
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Delivered);

        let sent = transport.sent_messages();
        assert_eq!(sent.len(), 1);
        let payload = WirePayload::from_bytes(&sent[0]).unwrap();
        assert_eq!(payload.chat_id.as_str(), "c1");
        assert_eq!(payload.text, "hi");
        assert_eq!(payload.sender, "You");

        // Delivered fire-and-forget messages are not persisted.
        assert!(store.by_status(MessageStatus::Sent).await.unwrap().is_empty());
        assert!(store
            .by_status(MessageStatus::Queued)
            .await
            .unwrap()
            .is_empty());

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn submit_while_offline_queues() {
        let (engine, transport, store) = start_engine().await;
        transport.set_online(false);

        let outcome = engine
            .submit("hi", "You", Some(ChatId::from("c1")))
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Queued);

        let queued = store.by_status(MessageStatus::Queued).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].text, "hi");
        assert_eq!(queued[0].chat_id.as_str(), "c1");

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn submit_without_chat_opens_fresh_conversation() {
        let (engine, transport, _store) = start_engine().await;

        engine.submit("hello", "You", None).await.unwrap();

        let payload = WirePayload::from_bytes(&transport.last_sent().unwrap()).unwrap();
        assert!(!payload.chat_id.as_str().is_empty());

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn submit_publishes_optimistically_before_store() {
        let (engine, _transport, store) = start_engine().await;

        let mut messages = engine.observe_messages(ChatId::from("c1")).await;
        engine.submit("hello", "You", None).await.unwrap();

        wait_for(&mut messages, |list| {
            list.iter().any(|m| m.text == "hello")
        })
        .await;

        // The delivered message lives only in the in-flight view.
        assert!(store
            .messages_for_chat(&ChatId::from("c1"))
            .await
            .unwrap()
            .is_empty());

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn queued_submit_shows_up_durably_in_open_view() {
        let (engine, transport, store) = start_engine().await;
        transport.set_online(false);

        let mut messages = engine.observe_messages(ChatId::from("c1")).await;
        engine.submit("stuck", "You", None).await.unwrap();

        wait_for(&mut messages, |list| {
            list.iter()
                .any(|m| m.text == "stuck" && m.status == MessageStatus::Queued)
        })
        .await;

        let queued = store.by_status(MessageStatus::Queued).await.unwrap();
        assert_eq!(queued.len(), 1);

        engine.shutdown().await;
    }

    // ===========================================
    // Queue Drain Tests
    // ===========================================

    #[tokio::test]
    async fn offline_then_online_drains_exactly_once() {
        let (engine, transport, store) = start_engine().await;
        transport.set_online(false);

        engine
            .submit("hi", "You", Some(ChatId::from("c1")))
            .await
            .unwrap();
        engine.set_connectivity(false).await;
        assert_eq!(transport.send_attempts(), 1);

        transport.set_online(true);
        engine.set_connectivity(true).await;

        let sent = store.by_status(MessageStatus::Sent).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert!(store
            .by_status(MessageStatus::Queued)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(transport.send_attempts(), 2);

        // A second "online" with no intervening "offline" must not drain.
        engine.set_connectivity(true).await;
        assert_eq!(transport.send_attempts(), 2);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn redundant_online_while_still_unreachable_drains_once() {
        let (engine, transport, store) = start_engine().await;
        transport.set_online(false);
        store
            .upsert(&queued_msg("m1", "c1", "waiting", 100))
            .await
            .unwrap();

        engine.set_connectivity(true).await;
        assert_eq!(transport.send_attempts(), 1);

        engine.set_connectivity(true).await;
        assert_eq!(transport.send_attempts(), 1);

        // Still queued, eligible for the next drain.
        assert_eq!(store.by_status(MessageStatus::Queued).await.unwrap().len(), 1);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn drain_isolates_individual_failures() {
        let (engine, transport, store) = start_engine().await;
        store.upsert(&queued_msg("a", "c1", "first", 100)).await.unwrap();
        store.upsert(&queued_msg("b", "c1", "second", 200)).await.unwrap();
        store.upsert(&queued_msg("c", "c1", "third", 300)).await.unwrap();

        // Drain order is (timestamp, id); fail the second delivery.
        transport.fail_send_attempt(2);
        engine.retry_queued().await;

        let sent = store.by_status(MessageStatus::Sent).await.unwrap();
        let sent_ids: Vec<_> = sent.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(sent_ids, ["a", "c"]);

        let queued = store.by_status(MessageStatus::Queued).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].id.as_str(), "b");

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn drain_with_empty_queue_is_silent() {
        let (engine, transport, _store) = start_engine().await;
        engine.retry_queued().await;
        assert_eq!(transport.send_attempts(), 0);
        engine.shutdown().await;
    }

    // ===========================================
    // Inbound Reconciliation Tests
    // ===========================================

    #[tokio::test]
    async fn inbound_structured_message_is_reconciled() {
        let (engine, transport, store) = start_engine().await;
        let mut chats = engine.observe_chat_summaries();

        transport.push_inbound(structured("m1", "c7", "ping"));

        wait_for(&mut chats, |list| {
            list.iter().any(|c| c.id.as_str() == "c7" && c.last_message == "ping")
        })
        .await;

        let stored = store.messages_for_chat(&ChatId::from("c7")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, MessageStatus::Sent);
        assert_eq!(stored[0].sender, "peer");

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn inbound_redelivery_is_idempotent() {
        let (engine, transport, store) = start_engine().await;
        let mut chats = engine.observe_chat_summaries();

        transport.push_inbound(structured("m1", "c7", "ping"));
        transport.push_inbound(structured("m1", "c7", "ping"));

        wait_for(&mut chats, |list| !list.is_empty()).await;
        // Let the second delivery reconcile too.
        sleep(Duration::from_millis(50)).await;

        let stored = store.messages_for_chat(&ChatId::from("c7")).await.unwrap();
        assert_eq!(stored.len(), 1);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_inbound_falls_back_to_text() {
        let (engine, transport, store) = start_engine().await;
        let mut chats = engine.observe_chat_summaries();

        transport.push_inbound(b"oops not json".to_vec());

        wait_for(&mut chats, |list| {
            list.iter().any(|c| c.last_message == "oops not json")
        })
        .await;

        let latest = store.latest_per_chat().await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].sender, SERVER_SENDER);
        assert_eq!(latest[0].status, MessageStatus::Sent);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn summary_orders_chats_newest_first() {
        let (engine, transport, _store) = start_engine().await;
        let mut chats = engine.observe_chat_summaries();

        transport.push_inbound(structured("a1", "a", "a first"));
        wait_for(&mut chats, |list| list.len() == 1).await;
        // Local reception time is the ordering key; keep arrivals apart.
        sleep(Duration::from_millis(5)).await;

        transport.push_inbound(structured("b1", "b", "b first"));
        wait_for(&mut chats, |list| list.len() == 2).await;
        sleep(Duration::from_millis(5)).await;

        transport.push_inbound(structured("a2", "a", "a again"));
        wait_for(&mut chats, |list| {
            list.first().map(|c| c.last_message.as_str()) == Some("a again")
        })
        .await;

        let order: Vec<_> = chats
            .borrow()
            .iter()
            .map(|c| c.id.as_str().to_string())
            .collect();
        assert_eq!(order, ["a", "b"]);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn open_chat_view_follows_inbound() {
        let (engine, transport, _store) = start_engine().await;
        let mut messages = engine.observe_messages(ChatId::from("c1")).await;

        transport.push_inbound(structured("m1", "c1", "for you"));

        wait_for(&mut messages, |list| {
            list.iter().any(|m| m.text == "for you")
        })
        .await;

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn switching_chats_switches_the_view() {
        let (engine, transport, _store) = start_engine().await;
        let mut chats = engine.observe_chat_summaries();

        transport.push_inbound(structured("m1", "c1", "in c1"));
        transport.push_inbound(structured("m2", "c2", "in c2"));
        wait_for(&mut chats, |list| list.len() == 2).await;

        let mut messages = engine.observe_messages(ChatId::from("c1")).await;
        wait_for(&mut messages, |list| {
            list.iter().any(|m| m.text == "in c1")
        })
        .await;

        let mut messages = engine.observe_messages(ChatId::from("c2")).await;
        wait_for(&mut messages, |list| {
            list.iter().any(|m| m.text == "in c2") && !list.iter().any(|m| m.text == "in c1")
        })
        .await;

        engine.shutdown().await;
    }

    // ===========================================
    // Startup and Shutdown Tests
    // ===========================================

    #[tokio::test]
    async fn startup_seeds_summaries_from_store() {
        let transport = MockTransport::new();
        let store: Arc<dyn MessageStore> = Arc::new(SqliteStore::in_memory().await.unwrap());
        store
            .upsert(&queued_msg("m1", "c1", "left over", 100))
            .await
            .unwrap();

        let engine = SyncEngine::start(EngineConfig::default(), transport, Arc::clone(&store))
            .await
            .unwrap();

        let chats = engine.observe_chat_summaries();
        let seeded = chats.borrow().clone();
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].last_message, "left over");

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn engine_connects_on_start() {
        let (engine, transport, _store) = start_engine().await;
        assert_eq!(
            transport.connected_address(),
            Some("ws://127.0.0.1:8080/chat".to_string())
        );
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn failed_connect_still_starts_engine() {
        let transport = MockTransport::new();
        transport.fail_next_connect("network unreachable");
        let store: Arc<dyn MessageStore> = Arc::new(SqliteStore::in_memory().await.unwrap());

        let engine = SyncEngine::start(
            EngineConfig::default(),
            transport.clone(),
            Arc::clone(&store),
        )
        .await
        .unwrap();

        // Submitting now queues instead of erroring.
        let outcome = engine
            .submit("hi", "You", Some(ChatId::from("c1")))
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Queued);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_stops_reconciliation() {
        let (engine, transport, store) = start_engine().await;

        engine.shutdown().await;
        transport.push_inbound(structured("m1", "c1", "too late"));
        sleep(Duration::from_millis(50)).await;

        assert!(store.latest_per_chat().await.unwrap().is_empty());
        assert!(!transport.is_connected());
    }
}
