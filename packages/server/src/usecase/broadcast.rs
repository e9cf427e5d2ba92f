//! Broadcast engine
//!
//! 参加済みの全接続へ独立に配信します。ある接続への送信失敗は
//! その接続の暗黙的な切断として扱い、他の接続への配信を妨げません。
//!
//! 送信失敗で切断したセッションの user_left は、同じファンアウトの中では送らず
//! `announce_departures` でキューとして後から処理します（再帰的なブロードキャストを避ける）。

use std::sync::Arc;

use futures_util::future::join_all;

use crate::domain::{CloseCode, ConnectionKey, RoomMessage, Transport};

use super::{IntentError, RoomCoordinator};

impl RoomCoordinator {
    /// Deliver `message` to every joined connection.
    ///
    /// Deliveries run concurrently and all outcomes are collected before returning.
    /// Failed connections are removed from the registry; the call itself never fails.
    pub async fn broadcast(&mut self, message: &RoomMessage) {
        let text = match self.codec.encode_message(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to encode broadcast {}: {}", message.id(), e);
                return;
            }
        };

        let targets: Vec<Arc<dyn Transport>> = self
            .registry
            .all()
            .map(|(transport, _)| Arc::clone(transport))
            .collect();
        let recipients = targets.len();

        let outcomes = join_all(targets.into_iter().map(|transport| {
            let text = text.clone();
            async move {
                let result = transport.send_text(text).await;
                (transport.key(), result)
            }
        }))
        .await;

        let mut failed = 0;
        for (key, outcome) in outcomes {
            if let Err(e) = outcome {
                failed += 1;
                tracing::warn!("Failed to deliver {} to {}: {}", message.id(), key, e);
                self.drop_connection(key, true);
            }
        }

        tracing::debug!(
            "Broadcasted {} in room '{}' to {} connection(s), {} failed",
            message.id(),
            self.room_id,
            recipients,
            failed
        );
    }

    /// Deliver `message` to one connection only.
    ///
    /// Returns `false` if the connection is gone or the write failed, in which case the
    /// connection has been treated as closed.
    pub async fn send_direct(&mut self, key: ConnectionKey, message: &RoomMessage) -> bool {
        match self.codec.encode_message(message) {
            Ok(text) => self.deliver_direct(key, text, true).await,
            Err(e) => {
                tracing::warn!("Failed to encode direct message {}: {}", message.id(), e);
                false
            }
        }
    }

    /// Report an error to the connection that caused it.
    pub(super) async fn report(&mut self, key: ConnectionKey, error: IntentError) -> bool {
        match self.codec.encode_error(error.code(), &error.to_string()) {
            Ok(text) => self.deliver_direct(key, text, true).await,
            Err(e) => {
                tracing::warn!("Failed to encode error for {}: {}", key, e);
                false
            }
        }
    }

    /// Single-target delivery.
    ///
    /// `announce_departure` controls whether a joined connection lost here is later
    /// announced with `user_left`.
    pub(super) async fn deliver_direct(
        &mut self,
        key: ConnectionKey,
        text: String,
        announce_departure: bool,
    ) -> bool {
        let Some(transport) = self.registry.transport_of(key) else {
            return false;
        };
        match transport.send_text(text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to deliver direct message to {}: {}", key, e);
                self.drop_connection(key, announce_departure);
                false
            }
        }
    }

    /// Remove a connection after a delivery failure.
    pub(super) fn drop_connection(&mut self, key: ConnectionKey, announce_departure: bool) {
        let Some(departure) = self.registry.remove(key) else {
            return;
        };
        departure.transport.set_attachment(None);
        departure
            .transport
            .close(CloseCode::GoingAway, "delivery failed");

        if let Some(session) = departure.session {
            tracing::info!(
                "Dropped '{}' ({}) from room '{}' after a delivery failure",
                session.display_name,
                key,
                self.room_id
            );
            if announce_departure {
                self.pending_departures.push_back(session);
            }
        }
    }

    /// Announce every session dropped by a delivery failure.
    ///
    /// Runs after the fan-out that detected the failures; announcements that fail in
    /// turn are queued and handled by the same loop.
    pub(super) async fn announce_departures(&mut self) {
        while let Some(session) = self.pending_departures.pop_front() {
            let ts = self.next_timestamp();
            let left = RoomMessage::user_left(session.display_name, ts);
            self.history.append(left.clone());
            self.broadcast(&left).await;
        }
    }
}
