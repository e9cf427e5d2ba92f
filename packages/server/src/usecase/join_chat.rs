//! Transition: Connected --Join(name)--> Joined

use crate::domain::{ConnectionKey, RoomMessage};

use super::{IntentError, JOIN_REPLAY_LIMIT, RoomCoordinator};

impl RoomCoordinator {
    /// 参加処理
    ///
    /// 1. レジストリにセッションを作成（重複名・不正名はここで拒否）
    /// 2. セッションをトランスポートへ添付（ブロードキャストより前に同期的に）
    /// 3. 参加者本人へ welcome と直近の履歴を直接送信
    /// 4. user_joined を履歴に追加し、本人を含む全参加者へブロードキャスト
    pub(super) async fn join_chat(&mut self, key: ConnectionKey, display_name: &str) {
        let joined_at = self.next_timestamp();
        let session = match self.registry.join(key, display_name, joined_at) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Join refused for {}: {}", key, e);
                self.report(key, IntentError::Join(e)).await;
                return;
            }
        };

        let Some(transport) = self.registry.transport_of(key) else {
            return;
        };
        match self.codec.encode_session(&session) {
            Ok(attachment) => transport.set_attachment(Some(attachment)),
            Err(e) => tracing::warn!(
                "Failed to attach session of '{}' to {}: {}",
                session.display_name,
                key,
                e
            ),
        }

        tracing::info!(
            "'{}' joined room '{}' as {}",
            session.display_name,
            self.room_id,
            session.connection_id
        );

        // 本人がまだ誰にも告知されていないので、ここでの送信失敗は user_left 不要
        let welcome = RoomMessage::system(
            format!("Welcome to the chat, {}!", session.display_name),
            joined_at,
        );
        let mut backlog = vec![welcome];
        backlog.extend(self.history.recent(JOIN_REPLAY_LIMIT));
        for message in &backlog {
            let text = match self.codec.encode_message(message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to encode {} for replay: {}", message.id(), e);
                    continue;
                }
            };
            if !self.deliver_direct(key, text, false).await {
                return;
            }
        }

        let joined = RoomMessage::user_joined(session.display_name, joined_at);
        self.history.append(joined.clone());
        self.broadcast(&joined).await;
    }
}
