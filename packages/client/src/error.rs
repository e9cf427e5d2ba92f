//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Username is already used by someone in the room
    #[error("Username '{0}' is already taken")]
    DuplicateName(String),

    /// Username was rejected by the server
    #[error("Invalid username: {0}")]
    InvalidName(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
