//! Domain entities
//!
//! - `Session`: 参加済み接続のアイデンティティ
//! - `RoomMessage`: ルーム内で発生し、配信・履歴保存されるイベント
//! - `ClientIntent`: クライアントから受信した要求（id/ts を持たない）

use super::value_object::{ConnectionId, DisplayName, MessageContent, MessageId, Timestamp};

/// Joined-state identity bound to one live connection.
///
/// A `Session` only exists after a successful join. It is also what the coordinator
/// attaches to the transport so that it can be read back after a rehydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub display_name: DisplayName,
    pub connection_id: ConnectionId,
    pub joined_at: Timestamp,
}

impl Session {
    pub fn new(display_name: DisplayName, joined_at: Timestamp) -> Self {
        Self {
            display_name,
            connection_id: ConnectionId::generate(),
            joined_at,
        }
    }
}

/// Event recorded in a room and fanned out to its participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomMessage {
    Chat {
        id: MessageId,
        content: MessageContent,
        author: DisplayName,
        ts: Timestamp,
    },
    UserJoined {
        id: MessageId,
        author: DisplayName,
        ts: Timestamp,
    },
    UserLeft {
        id: MessageId,
        author: DisplayName,
        ts: Timestamp,
    },
    System {
        id: MessageId,
        content: MessageContent,
        ts: Timestamp,
    },
}

impl RoomMessage {
    pub fn chat(author: DisplayName, content: MessageContent, ts: Timestamp) -> Self {
        Self::Chat {
            id: MessageId::generate(),
            content,
            author,
            ts,
        }
    }

    pub fn user_joined(author: DisplayName, ts: Timestamp) -> Self {
        Self::UserJoined {
            id: MessageId::generate(),
            author,
            ts,
        }
    }

    pub fn user_left(author: DisplayName, ts: Timestamp) -> Self {
        Self::UserLeft {
            id: MessageId::generate(),
            author,
            ts,
        }
    }

    pub fn system(content: impl Into<String>, ts: Timestamp) -> Self {
        Self::System {
            id: MessageId::generate(),
            content: MessageContent::system(content.into()),
            ts,
        }
    }

    pub fn id(&self) -> MessageId {
        match self {
            Self::Chat { id, .. }
            | Self::UserJoined { id, .. }
            | Self::UserLeft { id, .. }
            | Self::System { id, .. } => *id,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Chat { ts, .. }
            | Self::UserJoined { ts, .. }
            | Self::UserLeft { ts, .. }
            | Self::System { ts, .. } => *ts,
        }
    }

    /// Display name of the participant the event is about, if any.
    pub fn author(&self) -> Option<&DisplayName> {
        match self {
            Self::Chat { author, .. }
            | Self::UserJoined { author, .. }
            | Self::UserLeft { author, .. } => Some(author),
            Self::System { .. } => None,
        }
    }
}

/// Inbound request from a client.
///
/// Fields are raw strings; validation happens when the coordinator accepts the intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIntent {
    Join { display_name: String },
    Send { content: String },
    Leave,
}
