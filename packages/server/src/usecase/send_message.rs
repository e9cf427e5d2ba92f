//! Transition: Joined --Send(content)--> Joined

use crate::domain::{ConnectionKey, MessageContent, RoomMessage};

use super::{IntentError, RoomCoordinator};

impl RoomCoordinator {
    /// Validate, record and broadcast a chat message (sender included).
    pub(super) async fn send_message(&mut self, key: ConnectionKey, content: String) {
        let Some(author) = self
            .registry
            .session_of(key)
            .map(|session| session.display_name.clone())
        else {
            self.report(key, IntentError::NotJoined).await;
            return;
        };

        let content = match MessageContent::new(content) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Rejected message from '{}': {}", author, e);
                self.report(key, IntentError::InvalidMessage(e)).await;
                return;
            }
        };

        let ts = self.next_timestamp();
        let chat = RoomMessage::chat(author, content, ts);
        self.history.append(chat.clone());
        self.broadcast(&chat).await;
    }
}
