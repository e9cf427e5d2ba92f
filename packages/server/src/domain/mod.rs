//! Domain layer for the room coordinator.
//!
//! This module contains the room's state (sessions, history) and the seams the
//! coordinator depends on. It has no knowledge of JSON, axum, or WebSockets.

pub mod codec;
pub mod entity;
pub mod error;
pub mod history;
pub mod registry;
pub mod transport;
pub mod value_object;

pub use codec::WireCodec;
pub use entity::{ClientIntent, RoomMessage, Session};
pub use error::{CodecError, DeliveryError, JoinError, ValueObjectError};
pub use history::{HistoryBuffer, MAX_HISTORY};
pub use registry::{ConnectionState, SessionRegistry};
pub use transport::{AutoResponse, CloseCode, Transport, TransportHost};
#[cfg(test)]
pub use transport::MockTransport;
pub use value_object::{
    ConnectionId, ConnectionKey, DisplayName, MAX_CONTENT_LENGTH, MAX_USERNAME_LENGTH,
    MessageContent, MessageId, RoomId, Timestamp,
};
