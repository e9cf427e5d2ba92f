//! Rehydration
//!
//! ホストによってコーディネーターが破棄・再生成されたとき、まだ開いている
//! トランスポートの添付（join 時に書き込んだ Session）からレジストリを復元します。
//! 履歴はこの方法では復元できず、空から再開します（許容されたデータ損失）。

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{RoomId, Transport, TransportHost, WireCodec};

use super::RoomCoordinator;

/// Outcome of a rehydration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RehydrationReport {
    /// Connections restored as `Joined`
    pub restored: usize,
    /// Connections restored as `Connected` (no attachment)
    pub pending: usize,
    /// Attachments that could not be decoded or clashed with another session
    pub discarded: usize,
}

impl RoomCoordinator {
    /// Recreate a coordinator for `room_id` from the host's open transports.
    pub fn rehydrate(
        room_id: RoomId,
        host: &dyn TransportHost,
        codec: Arc<dyn WireCodec>,
        clock: Arc<dyn Clock>,
    ) -> (Self, RehydrationReport) {
        let mut coordinator = Self::new(room_id, host, codec, clock);
        let mut report = RehydrationReport::default();

        for transport in host.open_transports() {
            coordinator.adopt(transport, &mut report);
        }

        tracing::info!(
            "Rehydrated room '{}': {} joined, {} pending, {} discarded",
            coordinator.room_id,
            report.restored,
            report.pending,
            report.discarded
        );
        (coordinator, report)
    }

    fn adopt(&mut self, transport: Arc<dyn Transport>, report: &mut RehydrationReport) {
        let Some(raw) = transport.attachment() else {
            self.registry.register(transport);
            report.pending += 1;
            return;
        };

        let key = transport.key();
        let restored = self
            .codec
            .decode_session(&raw)
            .map_err(|e| e.to_string())
            .and_then(|session| {
                let joined_at = session.joined_at;
                self.registry
                    .restore(Arc::clone(&transport), session)
                    .map(|()| joined_at)
                    .map_err(|e| e.to_string())
            });

        match restored {
            Ok(joined_at) => {
                self.observe_timestamp(joined_at);
                report.restored += 1;
            }
            Err(reason) => {
                tracing::warn!("Discarding attachment of {}: {}", key, reason);
                transport.set_attachment(None);
                self.registry.register(transport);
                report.discarded += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionState, Session},
        infrastructure::codec::JsonWireCodec,
        test_support::{RecordingTransport, StaticHost},
        usecase::TransportEvent,
    };
    use parlor_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 破棄前に join したセッションが、再生成後も同じ Session として復元されること
    // - 履歴は空から再開すること
    // - 添付のない接続・壊れた添付・閉じた接続の扱い
    // ========================================

    fn room_id() -> RoomId {
        RoomId::new("lobby".to_string()).unwrap()
    }

    fn new_coordinator(host: &StaticHost) -> RoomCoordinator {
        RoomCoordinator::new(
            room_id(),
            host,
            Arc::new(JsonWireCodec),
            Arc::new(FixedClock::new(1_000)),
        )
    }

    fn rehydrate(host: &StaticHost) -> (RoomCoordinator, RehydrationReport) {
        RoomCoordinator::rehydrate(
            room_id(),
            host,
            Arc::new(JsonWireCodec),
            Arc::new(FixedClock::new(2_000)),
        )
    }

    async fn join(
        coordinator: &mut RoomCoordinator,
        host: &StaticHost,
        name: &str,
    ) -> Arc<RecordingTransport> {
        let transport = RecordingTransport::new();
        host.add(transport.clone());
        coordinator
            .handle(TransportEvent::Connected(transport.clone()))
            .await;
        coordinator
            .handle(TransportEvent::Message {
                key: transport.key(),
                payload: format!(r#"{{"type":"join_chat","username":"{name}"}}"#),
            })
            .await;
        transport
    }

    #[tokio::test]
    async fn test_sessions_survive_eviction() {
        // テスト項目: 破棄・再生成後も A の Session がそのまま復元され、履歴は空になる
        // given (前提条件):
        let host = StaticHost::new();
        let mut coordinator = new_coordinator(&host);
        let alice = join(&mut coordinator, &host, "alice").await;
        let original: Option<Session> = coordinator.registry().session_of(alice.key()).cloned();
        assert!(!coordinator.history().is_empty());

        // when (操作): 破棄して再生成
        drop(coordinator);
        let (rehydrated, report) = rehydrate(&host);

        // then (期待する結果):
        assert_eq!(rehydrated.registry().session_of(alice.key()).cloned(), original);
        assert!(rehydrated.history().is_empty());
        assert_eq!(report.restored, 1);
        assert_eq!(rehydrated.status().connected_users, 1);
    }

    #[tokio::test]
    async fn test_rehydrated_room_keeps_working() {
        // テスト項目: 再生成後も復元された参加者同士で送受信でき、名前の重複も検出される
        // given (前提条件):
        let host = StaticHost::new();
        let mut coordinator = new_coordinator(&host);
        let alice = join(&mut coordinator, &host, "alice").await;
        let bob = join(&mut coordinator, &host, "bob").await;
        drop(coordinator);
        let (mut coordinator, _) = rehydrate(&host);
        alice.clear();
        bob.clear();

        // when (操作):
        coordinator
            .handle(TransportEvent::Message {
                key: bob.key(),
                payload: r#"{"type":"send_message","content":"still here"}"#.to_string(),
            })
            .await;
        let impostor = join(&mut coordinator, &host, "alice").await;

        // then (期待する結果):
        assert_eq!(alice.frames()[0]["content"], "still here");
        assert_eq!(alice.frames()[0]["username"], "bob");
        assert_eq!(impostor.frames()[0]["code"], "duplicate_username");
    }

    #[tokio::test]
    async fn test_unjoined_and_corrupt_connections_become_connected() {
        // テスト項目: 添付のない接続と壊れた添付を持つ接続は Connected として復元される
        // given (前提条件):
        let host = StaticHost::new();
        let lurker = RecordingTransport::new();
        let corrupt = RecordingTransport::new();
        corrupt.set_attachment(Some("{broken".to_string()));
        host.add(lurker.clone());
        host.add(corrupt.clone());

        // when (操作):
        let (coordinator, report) = rehydrate(&host);

        // then (期待する結果):
        assert_eq!(
            coordinator.registry().state_of(lurker.key()),
            ConnectionState::Connected
        );
        assert_eq!(
            coordinator.registry().state_of(corrupt.key()),
            ConnectionState::Connected
        );
        assert_eq!(corrupt.attachment(), None);
        assert_eq!(
            report,
            RehydrationReport {
                restored: 0,
                pending: 1,
                discarded: 1
            }
        );
    }

    #[tokio::test]
    async fn test_left_and_closed_connections_are_not_revived() {
        // テスト項目: 退出済み・クローズ済みの接続は再生成時に復元されない
        // given (前提条件):
        let host = StaticHost::new();
        let mut coordinator = new_coordinator(&host);
        let alice = join(&mut coordinator, &host, "alice").await;
        let bob = join(&mut coordinator, &host, "bob").await;
        coordinator
            .handle(TransportEvent::Message {
                key: bob.key(),
                payload: r#"{"type":"leave_chat"}"#.to_string(),
            })
            .await;
        drop(coordinator);

        // when (操作):
        let (coordinator, _) = rehydrate(&host);

        // then (期待する結果):
        assert_eq!(
            coordinator.registry().state_of(alice.key()),
            ConnectionState::Joined
        );
        assert_eq!(
            coordinator.registry().state_of(bob.key()),
            ConnectionState::Closed
        );
    }

    #[tokio::test]
    async fn test_rehydration_keeps_timestamps_monotonic() {
        // テスト項目: 復元したセッションの joined_at より前の ts は発行されない
        // given (前提条件):
        let host = StaticHost::new();
        let mut coordinator = RoomCoordinator::new(
            room_id(),
            host.as_ref(),
            Arc::new(JsonWireCodec),
            Arc::new(FixedClock::new(50_000)),
        );
        let alice = join(&mut coordinator, &host, "alice").await;
        drop(coordinator);

        // when (操作): 時計が遅れたホストで再生成
        let (mut coordinator, _) = rehydrate(&host);
        alice.clear();
        coordinator
            .handle(TransportEvent::Message {
                key: alice.key(),
                payload: r#"{"type":"send_message","content":"tick"}"#.to_string(),
            })
            .await;

        // then (期待する結果):
        assert_eq!(alice.frames()[0]["timestamp"], 50_000);
    }
}
