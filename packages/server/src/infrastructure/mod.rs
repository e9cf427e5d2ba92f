//! Infrastructure layer: wire format and the WebSocket-backed transport.

pub mod codec;
pub mod dto;
pub mod transport;
