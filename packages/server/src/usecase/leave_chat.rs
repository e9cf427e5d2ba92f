//! Transitions: Joined --Leave--> Closed, Connected --(close)--> Closed

use crate::domain::{CloseCode, ConnectionKey, RoomMessage};

use super::RoomCoordinator;

impl RoomCoordinator {
    pub(super) async fn leave_chat(&mut self, key: ConnectionKey) {
        tracing::info!("Connection {} asked to leave room '{}'", key, self.room_id);
        self.depart(key).await;
    }

    /// Remove the entry, announce the departure if a session existed, then close.
    pub(super) async fn depart(&mut self, key: ConnectionKey) {
        let Some(departure) = self.registry.remove(key) else {
            return;
        };
        // 再水和で復活しないよう、添付を先に消す
        departure.transport.set_attachment(None);

        if let Some(session) = departure.session {
            tracing::info!("'{}' left room '{}'", session.display_name, self.room_id);
            let ts = self.next_timestamp();
            let left = RoomMessage::user_left(session.display_name, ts);
            self.history.append(left.clone());
            self.broadcast(&left).await;
        }

        departure.transport.close(CloseCode::Normal, "left the chat");
    }
}
