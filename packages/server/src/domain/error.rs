//! Domain errors.

use thiserror::Error;

use super::value_object::DisplayName;

/// Validation errors raised while constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Username must not be empty")]
    DisplayNameEmpty,

    #[error("Username is too long ({length} characters, max {max})")]
    DisplayNameTooLong { length: usize, max: usize },

    #[error("Message must not be empty")]
    MessageContentEmpty,

    #[error("Message is too long ({length} characters, max {max})")]
    MessageContentTooLong { length: usize, max: usize },

    #[error("Invalid room id: '{0}'")]
    InvalidRoomId(String),
}

/// Join を拒否する理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// 表示名が不正（トリム後に空、または長すぎる）
    #[error("{0}")]
    InvalidName(ValueObjectError),

    /// 同じ表示名のセッションが既に存在する
    #[error("Username '{0}' is already taken")]
    DuplicateName(DisplayName),

    /// この接続は既に参加済み
    #[error("This connection has already joined the chat")]
    AlreadyJoined,

    /// 接続がレジストリに存在しない
    #[error("Connection is not registered")]
    UnknownConnection,
}

/// A transport could not deliver a frame.
///
/// Always handled as an implicit disconnect of that one connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Transport is closed")]
    Closed,

    #[error("Transport write failed: {0}")]
    WriteFailed(String),
}

/// A frame could not be encoded, or a payload (or transport attachment) decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Unknown message type: '{0}'")]
    UnknownType(String),

    #[error("Corrupt session attachment: {0}")]
    CorruptAttachment(String),

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}
