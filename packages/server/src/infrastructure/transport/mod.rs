//! Transport implementations
//!
//! - `websocket`: WebSocket を使った `Transport` 実装
//! - `hub`: ルームごとの開いているトランスポートの集合（コーディネーターより長生き）

pub mod hub;
pub mod websocket;

pub use hub::ConnectionHub;
pub use websocket::{Outbound, WebSocketTransport};
