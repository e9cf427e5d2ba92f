//! Host for a single room.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parlor_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionKey, RoomId, Transport, WireCodec},
    infrastructure::transport::ConnectionHub,
    usecase::{RoomCoordinator, RoomStatus, TransportEvent},
};

pub(super) struct Slot {
    coordinator: Option<RoomCoordinator>,
    last_activity: Instant,
}

/// Owns the (possibly evicted) coordinator of one room.
///
/// Every event is handled while holding the slot lock, so at most one
/// coordinator instance exists per room and events never interleave.
pub struct RoomHost {
    room_id: RoomId,
    hub: Arc<ConnectionHub>,
    codec: Arc<dyn WireCodec>,
    clock: Arc<dyn Clock>,
    slot: Mutex<Slot>,
}

impl RoomHost {
    pub fn new(room_id: RoomId, codec: Arc<dyn WireCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            room_id,
            hub: Arc::new(ConnectionHub::new()),
            codec,
            clock,
            slot: Mutex::new(Slot {
                coordinator: None,
                last_activity: Instant::now(),
            }),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn hub(&self) -> &Arc<ConnectionHub> {
        &self.hub
    }

    pub fn open_connections(&self) -> usize {
        self.hub.open_count()
    }

    /// Accept a new transport and hand the connection event to the coordinator.
    pub async fn connect(&self, transport: Arc<dyn Transport>) {
        let mut slot = self.slot.lock().await;
        // 先に起こしておけば、新しい接続が再水和で二重に拾われない
        let coordinator = self.resident(&mut slot);
        self.hub.accept(transport.clone());
        coordinator
            .handle(TransportEvent::Connected(transport))
            .await;
    }

    /// Hand an inbound text payload to the coordinator.
    pub async fn dispatch(&self, key: ConnectionKey, payload: String) {
        let mut slot = self.slot.lock().await;
        self.resident(&mut slot)
            .handle(TransportEvent::Message { key, payload })
            .await;
    }

    /// Report a frame that could not be read as text.
    pub async fn reject(&self, key: ConnectionKey, reason: String) {
        let mut slot = self.slot.lock().await;
        self.resident(&mut slot)
            .handle(TransportEvent::Unreadable { key, reason })
            .await;
    }

    /// Report that the transport went away.
    ///
    /// Must be called while the transport still reports itself open, so that an
    /// evicted room rehydrates the departing session before announcing it.
    pub async fn disconnect(&self, key: ConnectionKey) {
        let mut slot = self.slot.lock().await;
        self.resident(&mut slot)
            .handle(TransportEvent::Closed { key })
            .await;
        self.hub.release(key);
    }

    /// Read the room's counts.
    ///
    /// 読み取りはアクティビティとして数えない（ポーリングで破棄が止まらないように）。
    pub async fn status(&self) -> RoomStatus {
        let mut slot = self.slot.lock().await;
        slot.coordinator
            .get_or_insert_with(|| self.rehydrate())
            .status()
    }

    pub async fn is_resident(&self) -> bool {
        self.slot.lock().await.coordinator.is_some()
    }

    /// Residency without waiting; `None` while an event is being processed.
    pub fn try_is_resident(&self) -> Option<bool> {
        self.slot
            .try_lock()
            .ok()
            .map(|slot| slot.coordinator.is_some())
    }

    /// Drop the in-memory coordinator; returns whether one was resident.
    pub async fn evict(&self) -> bool {
        let evicted = self.slot.lock().await.coordinator.take().is_some();
        if evicted {
            tracing::info!("Evicted coordinator of room '{}'", self.room_id);
        }
        evicted
    }

    /// Evict the coordinator if no event reached it for at least `idle`.
    ///
    /// A room that is processing an event right now is not idle and is skipped.
    pub fn evict_if_idle(&self, idle: Duration) -> bool {
        let Ok(mut slot) = self.slot.try_lock() else {
            return false;
        };
        if slot.coordinator.is_none() || slot.last_activity.elapsed() < idle {
            return false;
        }
        slot.coordinator = None;
        tracing::info!("Evicted idle coordinator of room '{}'", self.room_id);
        true
    }

    fn resident<'a>(&self, slot: &'a mut Slot) -> &'a mut RoomCoordinator {
        slot.last_activity = Instant::now();
        slot.coordinator.get_or_insert_with(|| self.rehydrate())
    }

    fn rehydrate(&self) -> RoomCoordinator {
        let (coordinator, _report) = RoomCoordinator::rehydrate(
            self.room_id.clone(),
            self.hub.as_ref(),
            self.codec.clone(),
            self.clock.clone(),
        );
        coordinator
    }

    #[cfg(test)]
    pub(super) async fn lock_slot(&self) -> tokio::sync::MutexGuard<'_, Slot> {
        self.slot.lock().await
    }
}
