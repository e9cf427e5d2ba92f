//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use crate::error::ClientError;

/// What a line typed by the user asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// `/leave`: leave the room and let the server close the connection
    Leave,
    /// `/quit`: close the connection without leaving explicitly
    Quit,
    /// Anything else is sent as a chat message
    Send(String),
}

/// Interpret one line of user input.
pub fn parse_input(line: &str) -> InputCommand {
    match line.trim() {
        "/leave" => InputCommand::Leave,
        "/quit" => InputCommand::Quit,
        other => InputCommand::Send(other.to_string()),
    }
}

/// Map an error frame to a client error that must end the client.
///
/// # Returns
///
/// `Some` for errors no reconnection can fix (the username is refused),
/// `None` for errors that are only displayed
pub fn fatal_error(code: &str, username: &str, message: &str) -> Option<ClientError> {
    match code {
        "duplicate_username" => Some(ClientError::DuplicateName(username.to_string())),
        "invalid_username" => Some(ClientError::InvalidName(message.to_string())),
        _ => None,
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// # Returns
///
/// `true` if the error requires immediate exit (the username was refused),
/// `false` otherwise
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::DuplicateName(_) | ClientError::InvalidName(_)
    )
}

/// Count of failed attempts after another failure.
///
/// # Arguments
///
/// * `current_attempts` - Failed attempts so far
/// * `established` - Whether this attempt got connected before it failed
///
/// # Returns
///
/// `1` when the session had been established (a fresh outage starts now),
/// `current_attempts + 1` otherwise
pub fn attempts_after_failure(current_attempts: u32, established: bool) -> u32 {
    if established {
        1
    } else {
        current_attempts + 1
    }
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
