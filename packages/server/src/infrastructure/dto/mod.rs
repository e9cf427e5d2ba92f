//! Data Transfer Objects (DTOs) for the chat application.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs and the transport attachment
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
