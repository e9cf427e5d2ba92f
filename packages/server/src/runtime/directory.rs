//! Room directory
//!
//! ルーム ID から `RoomHost` を引く。存在しなければその場で作成する。
//! スイーパーがアイドルなコーディネーターを破棄し、接続のないルームを忘れる。

use std::{collections::HashMap, sync::Arc, time::Duration};

use parlor_shared::time::Clock;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::domain::{RoomId, WireCodec};

use super::RoomHost;

/// Snapshot of one hosted room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub open_connections: usize,
    pub resident: bool,
}

pub struct RoomDirectory {
    rooms: Mutex<HashMap<RoomId, Arc<RoomHost>>>,
    codec: Arc<dyn WireCodec>,
    clock: Arc<dyn Clock>,
}

impl RoomDirectory {
    pub fn new(codec: Arc<dyn WireCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            codec,
            clock,
        }
    }

    /// Host for `room_id`, created on first use.
    pub async fn get_or_create(&self, room_id: &RoomId) -> Arc<RoomHost> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                tracing::info!("Room '{}' created", room_id);
                Arc::new(RoomHost::new(
                    room_id.clone(),
                    self.codec.clone(),
                    self.clock.clone(),
                ))
            })
            .clone()
    }

    pub async fn get(&self, room_id: &RoomId) -> Option<Arc<RoomHost>> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Summaries of every known room, sorted by id.
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let hosts: Vec<Arc<RoomHost>> = self.rooms.lock().await.values().cloned().collect();
        let mut summaries = Vec::with_capacity(hosts.len());
        for host in hosts {
            summaries.push(RoomSummary {
                room_id: host.room_id().clone(),
                open_connections: host.open_connections(),
                resident: host.is_resident().await,
            });
        }
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }

    /// Evict idle coordinators and forget rooms with nothing left in them.
    ///
    /// Returns the number of evicted coordinators.
    pub async fn sweep(&self, idle: Duration) -> usize {
        let hosts: Vec<Arc<RoomHost>> = self.rooms.lock().await.values().cloned().collect();
        let mut evicted = 0;
        for host in &hosts {
            if host.evict_if_idle(idle) {
                evicted += 1;
            }
        }
        drop(hosts);

        // ルーム全体のロック中は各ホストのロックを待たない
        let mut rooms = self.rooms.lock().await;
        rooms.retain(|room_id, host| {
            // ハンドラーが参照を持っているホストは残す
            let forget = Arc::strong_count(host) == 1
                && host.open_connections() == 0
                && host.try_is_resident() == Some(false);
            if forget {
                tracing::debug!("Forgot empty room '{}'", room_id);
            }
            !forget
        });
        evicted
    }

    /// Run [`Self::sweep`] periodically in the background.
    pub fn spawn_sweeper(self: Arc<Self>, idle: Duration) -> JoinHandle<()> {
        let period = idle.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = self.sweep(idle).await;
                if evicted > 0 {
                    tracing::debug!("Sweeper evicted {} coordinator(s)", evicted);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Transport, infrastructure::codec::JsonWireCodec,
        test_support::RecordingTransport,
    };
    use parlor_shared::time::SystemClock;

    fn directory() -> RoomDirectory {
        RoomDirectory::new(Arc::new(JsonWireCodec), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_host() {
        // テスト項目: 同じルーム ID には同じホストが返る
        // given (前提条件):
        let directory = directory();
        let lobby = RoomId::new("lobby".to_string()).unwrap();

        // when (操作):
        let first = directory.get_or_create(&lobby).await;
        let second = directory.get_or_create(&lobby).await;

        // then (期待する結果):
        assert!(Arc::ptr_eq(&first, &second));
        assert!(directory.get(&RoomId::new("other".to_string()).unwrap()).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_skips_busy_room_without_blocking() {
        // テスト項目: 処理中のルームがあってもスイープは待たずに終わり、他のルームの作成も止まらない
        // given (前提条件):
        let directory = directory();
        let busy = RoomId::new("busy".to_string()).unwrap();
        let host = directory.get_or_create(&busy).await;
        host.status().await;
        let guard = host.lock_slot().await;

        // when (操作):
        let evicted = tokio::time::timeout(Duration::from_secs(1), directory.sweep(Duration::ZERO))
            .await
            .expect("sweep waited for a busy room");
        let other = tokio::time::timeout(
            Duration::from_secs(1),
            directory.get_or_create(&RoomId::new("other".to_string()).unwrap()),
        )
        .await;

        // then (期待する結果):
        assert_eq!(evicted, 0);
        assert!(other.is_ok());
        drop(guard);
        assert!(directory.get(&busy).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_evicts_and_forgets_empty_rooms() {
        // テスト項目: スイープで全コーディネーターが破棄され、接続のないルームだけが忘れられる
        // given (前提条件):
        let directory = directory();
        let lobby = RoomId::new("lobby".to_string()).unwrap();
        let empty = RoomId::new("empty".to_string()).unwrap();
        let transport = RecordingTransport::new();
        directory.get_or_create(&lobby).await.connect(transport.clone()).await;
        directory.get_or_create(&empty).await.status().await;

        // when (操作):
        let evicted = directory.sweep(Duration::ZERO).await;

        // then (期待する結果):
        assert_eq!(evicted, 2);
        let summaries = directory.summaries().await;
        assert_eq!(
            summaries,
            vec![RoomSummary {
                room_id: lobby,
                open_connections: 1,
                resident: false,
            }]
        );
        assert!(transport.is_open());
    }
}
