//! Conversion logic between DTOs and domain entities.

use uuid::Uuid;

use crate::domain::{
    ClientIntent, CodecError, ConnectionId, DisplayName, RoomMessage, Session, Timestamp,
};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::ClientIntentDto> for ClientIntent {
    fn from(dto: dto::ClientIntentDto) -> Self {
        match dto {
            dto::ClientIntentDto::JoinChat { username } => Self::Join {
                display_name: username,
            },
            dto::ClientIntentDto::SendMessage { content } => Self::Send { content },
            dto::ClientIntentDto::LeaveChat {} => Self::Leave,
        }
    }
}

impl TryFrom<dto::SessionAttachment> for Session {
    type Error = CodecError;

    fn try_from(dto: dto::SessionAttachment) -> Result<Self, Self::Error> {
        let display_name = DisplayName::new(dto.username)
            .map_err(|e| CodecError::CorruptAttachment(e.to_string()))?;
        let connection_id = Uuid::parse_str(&dto.connection_id)
            .map_err(|e| CodecError::CorruptAttachment(e.to_string()))?;
        Ok(Self {
            display_name,
            connection_id: ConnectionId::from_uuid(connection_id),
            joined_at: Timestamp::new(dto.joined_at),
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&RoomMessage> for dto::ServerFrame {
    fn from(model: &RoomMessage) -> Self {
        match model {
            RoomMessage::Chat {
                id,
                content,
                author,
                ts,
            } => Self::Message {
                id: id.to_string(),
                content: content.as_str().to_string(),
                username: author.as_str().to_string(),
                timestamp: ts.value(),
            },
            RoomMessage::UserJoined { id, author, ts } => Self::UserJoined {
                id: id.to_string(),
                username: author.as_str().to_string(),
                timestamp: ts.value(),
            },
            RoomMessage::UserLeft { id, author, ts } => Self::UserLeft {
                id: id.to_string(),
                username: author.as_str().to_string(),
                timestamp: ts.value(),
            },
            RoomMessage::System { id, content, ts } => Self::Server {
                id: id.to_string(),
                content: content.as_str().to_string(),
                timestamp: ts.value(),
            },
        }
    }
}

impl From<&Session> for dto::SessionAttachment {
    fn from(model: &Session) -> Self {
        Self {
            username: model.display_name.as_str().to_string(),
            connection_id: model.connection_id.to_string(),
            joined_at: model.joined_at.value(),
        }
    }
}
