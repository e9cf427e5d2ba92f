//! Errors reported back to the connection that caused them.

use thiserror::Error;

use crate::domain::{CodecError, JoinError, ValueObjectError};

/// Why an inbound intent was refused.
///
/// Never broadcast and never fatal to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("{0}")]
    InvalidPayload(CodecError),

    #[error("{0}")]
    Join(JoinError),

    #[error("{0}")]
    InvalidMessage(ValueObjectError),

    #[error("You must join the chat before sending messages")]
    NotJoined,
}

impl IntentError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "invalid_payload",
            Self::Join(JoinError::InvalidName(_)) => "invalid_username",
            Self::Join(JoinError::DuplicateName(_)) => "duplicate_username",
            Self::Join(JoinError::AlreadyJoined) => "already_joined",
            Self::Join(JoinError::UnknownConnection) => "not_connected",
            Self::InvalidMessage(_) => "invalid_message",
            Self::NotJoined => "not_joined",
        }
    }
}
