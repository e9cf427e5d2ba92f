//! WebSocket frame DTOs for the chat application.

use serde::{Deserialize, Serialize};

/// `type` values accepted from clients
pub const INTENT_TYPES: [&str; 3] = ["join_chat", "send_message", "leave_chat"];

/// Inbound client intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientIntentDto {
    JoinChat { username: String },
    SendMessage { content: String },
    LeaveChat {},
}

/// Every frame the server sends to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Chat message
    Message {
        id: String,
        content: String,
        username: String,
        timestamp: i64,
    },
    /// Participant joined notification
    UserJoined {
        id: String,
        username: String,
        timestamp: i64,
    },
    /// Participant left notification
    UserLeft {
        id: String,
        username: String,
        timestamp: i64,
    },
    /// Server-authored notice (welcome etc.)
    Server {
        id: String,
        content: String,
        timestamp: i64,
    },
    /// Error addressed only to the offending connection
    Error { code: String, message: String },
}

/// Session metadata attached to a transport at join time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttachment {
    pub username: String,
    pub connection_id: String,
    pub joined_at: i64,
}
