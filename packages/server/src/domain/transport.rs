//! Transport seams
//!
//! コーディネーターが接続（WebSocket など）とホストに対して要求するインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{error::DeliveryError, value_object::ConnectionKey};

/// Literal liveness probe answered by the host without waking the coordinator.
pub const KEEP_ALIVE_REQUEST: &str = "ping";

/// Literal reply to [`KEEP_ALIVE_REQUEST`].
pub const KEEP_ALIVE_RESPONSE: &str = "pong";

/// Close codes the coordinator uses when it closes a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    /// 1000: the participant left
    Normal,
    /// 1001: the connection was dropped after a delivery failure
    GoingAway,
}

impl CloseCode {
    pub fn code(self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::GoingAway => 1001,
        }
    }
}

/// Request/response pair answered by the transport layer itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoResponse {
    pub request: String,
    pub response: String,
}

impl AutoResponse {
    pub fn new(request: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            response: response.into(),
        }
    }

    /// The `"ping"` → `"pong"` keep-alive pair.
    pub fn keep_alive() -> Self {
        Self::new(KEEP_ALIVE_REQUEST, KEEP_ALIVE_RESPONSE)
    }

    /// Reply for `payload`, if it is exactly the registered request.
    pub fn reply_to(&self, payload: &str) -> Option<&str> {
        (payload == self.request).then_some(self.response.as_str())
    }
}

/// Persistent bidirectional connection to one participant.
///
/// The transport outlives the coordinator that serves it: it carries an opaque
/// attachment which the coordinator writes at join time and reads back on rehydration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Stable key assigned when the host accepted the connection
    fn key(&self) -> ConnectionKey;

    /// Deliver one text frame
    async fn send_text(&self, text: String) -> Result<(), DeliveryError>;

    /// Close the transport; a no-op when already closed
    fn close(&self, code: CloseCode, reason: &str);

    fn is_open(&self) -> bool;

    /// Metadata attached to this transport, if any
    fn attachment(&self) -> Option<String>;

    /// Replace (or clear) the attached metadata
    fn set_attachment(&self, attachment: Option<String>);
}

/// Host of the open transports belonging to one room.
pub trait TransportHost: Send + Sync {
    /// Transports that are still open, in acceptance order
    fn open_transports(&self) -> Vec<Arc<dyn Transport>>;

    /// Register a pair that the host answers without involving the coordinator
    fn set_auto_response(&self, auto_response: AutoResponse);
}
