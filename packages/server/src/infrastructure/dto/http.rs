//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Status read for one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatusDto {
    pub connected_users: usize,
    pub message_history: usize,
}

/// Entry of the room list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub open_connections: usize,
    /// Whether a coordinator is currently resident (not evicted)
    pub resident: bool,
}
