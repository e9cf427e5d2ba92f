//! Room coordinator
//!
//! 1 ルームにつき 1 インスタンスだけが存在する、シングルスレッドのアクター。
//! トランスポートイベントを 1 件ずつ最後まで処理（ブロードキャストを含む）してから
//! 次のイベントを処理します。直列化は呼び出し側（`runtime::RoomHost`）が保証します。

use std::{collections::VecDeque, sync::Arc};

use parlor_shared::time::Clock;

use crate::domain::{
    AutoResponse, ClientIntent, CodecError, ConnectionKey, ConnectionState, HistoryBuffer,
    RoomId, Session, SessionRegistry, Timestamp, Transport, TransportHost, WireCodec,
};

/// Number of history entries replayed to a new joiner.
pub const JOIN_REPLAY_LIMIT: usize = 10;

/// Event delivered by the transport layer.
pub enum TransportEvent {
    /// A new transport was accepted for this room
    Connected(Arc<dyn Transport>),
    /// A text frame arrived (keep-alive probes never get here)
    Message {
        key: ConnectionKey,
        payload: String,
    },
    /// A frame arrived that is not text at all (e.g. binary that is not UTF-8)
    Unreadable { key: ConnectionKey, reason: String },
    /// The transport closed or errored
    Closed { key: ConnectionKey },
}

/// Read-only snapshot of the coordinator's sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStatus {
    pub connected_users: usize,
    pub message_history: usize,
}

/// Owns the session registry and history of one room.
pub struct RoomCoordinator {
    pub(super) room_id: RoomId,
    pub(super) registry: SessionRegistry,
    pub(super) history: HistoryBuffer,
    pub(super) codec: Arc<dyn WireCodec>,
    clock: Arc<dyn Clock>,
    last_timestamp: Timestamp,
    /// 送信失敗で切断されたセッション。ファンアウト完了後に user_left を通知する
    pub(super) pending_departures: VecDeque<Session>,
}

impl RoomCoordinator {
    /// Create an empty coordinator and register the keep-alive pair with the host.
    pub fn new(
        room_id: RoomId,
        host: &dyn TransportHost,
        codec: Arc<dyn WireCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        host.set_auto_response(AutoResponse::keep_alive());
        Self {
            room_id,
            registry: SessionRegistry::new(),
            history: HistoryBuffer::new(),
            codec,
            clock,
            last_timestamp: Timestamp::new(i64::MIN),
            pending_departures: VecDeque::new(),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn status(&self) -> RoomStatus {
        RoomStatus {
            connected_users: self.registry.joined_count(),
            message_history: self.history.len(),
        }
    }

    /// Process one transport event to completion.
    pub async fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected(transport) => self.on_connect(transport),
            TransportEvent::Message { key, payload } => self.on_message(key, &payload).await,
            TransportEvent::Unreadable { key, reason } => self.on_unreadable(key, reason).await,
            TransportEvent::Closed { key } => self.on_close(key).await,
        }
        self.announce_departures().await;
    }

    fn on_connect(&mut self, transport: Arc<dyn Transport>) {
        let key = transport.key();
        if self.registry.register(transport) {
            tracing::info!("Connection {} opened in room '{}'", key, self.room_id);
        } else {
            tracing::debug!("Connection {} is already registered", key);
        }
    }

    async fn on_message(&mut self, key: ConnectionKey, payload: &str) {
        if self.registry.state_of(key) == ConnectionState::Closed {
            tracing::debug!("Dropping payload from closed connection {}", key);
            return;
        }

        let intent = match self.codec.decode_intent(payload) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!("Invalid payload from {}: {}", key, e);
                self.report(key, super::IntentError::InvalidPayload(e)).await;
                return;
            }
        };

        match intent {
            ClientIntent::Join { display_name } => self.join_chat(key, &display_name).await,
            ClientIntent::Send { content } => self.send_message(key, content).await,
            ClientIntent::Leave => self.leave_chat(key).await,
        }
    }

    async fn on_unreadable(&mut self, key: ConnectionKey, reason: String) {
        if self.registry.state_of(key) == ConnectionState::Closed {
            return;
        }
        tracing::warn!("Unreadable frame from {}: {}", key, reason);
        let error = CodecError::Malformed(reason);
        self.report(key, super::IntentError::InvalidPayload(error))
            .await;
    }

    async fn on_close(&mut self, key: ConnectionKey) {
        if self.registry.state_of(key) == ConnectionState::Closed {
            tracing::debug!("Duplicate close for connection {}", key);
            return;
        }
        tracing::info!("Connection {} closed by transport", key);
        self.depart(key).await;
    }

    /// Mint a timestamp that never goes backwards within this room.
    pub(super) fn next_timestamp(&mut self) -> Timestamp {
        let now = Timestamp::new(self.clock.now_millis());
        self.last_timestamp = self.last_timestamp.max(now);
        self.last_timestamp
    }

    /// Make sure later timestamps are not older than `ts`.
    pub(super) fn observe_timestamp(&mut self, ts: Timestamp) {
        self.last_timestamp = self.last_timestamp.max(ts);
    }
}
