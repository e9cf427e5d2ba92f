//! UseCase layer: the per-room coordinator.
//!
//! - `coordinator`: state, event dispatch, status query
//! - `join_chat` / `send_message` / `leave_chat`: lifecycle transitions
//! - `broadcast`: fan-out and direct delivery with failure isolation
//! - `rehydrate`: rebuilding the registry from transport attachments

mod broadcast;
mod coordinator;
mod error;
mod join_chat;
mod leave_chat;
mod rehydrate;
mod send_message;

pub use coordinator::{JOIN_REPLAY_LIMIT, RoomCoordinator, RoomStatus, TransportEvent};
pub use error::IntentError;
pub use rehydrate::RehydrationReport;
