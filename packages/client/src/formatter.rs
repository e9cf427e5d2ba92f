//! Message formatting utilities for client display.

use parlor_server::infrastructure::dto::websocket::ServerFrame;
use parlor_shared::time::{timestamp_to_local_hms, timestamp_to_rfc3339};

const RULE: &str = "------------------------------------------------------------";

fn hms(timestamp: i64) -> String {
    timestamp_to_local_hms(timestamp).unwrap_or_else(|| "--:--:--".to_string())
}

fn rfc3339(timestamp: i64) -> String {
    timestamp_to_rfc3339(timestamp).unwrap_or_else(|| timestamp.to_string())
}

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any frame received from the server
    ///
    /// # Arguments
    ///
    /// * `frame` - The decoded frame
    /// * `me` - The current user's name (to mark own messages)
    pub fn format_frame(frame: &ServerFrame, me: &str) -> String {
        match frame {
            ServerFrame::Message {
                content,
                username,
                timestamp,
                ..
            } => Self::format_chat_message(username, content, *timestamp, username == me),
            ServerFrame::UserJoined {
                username,
                timestamp,
                ..
            } => Self::format_user_joined(username, *timestamp),
            ServerFrame::UserLeft {
                username,
                timestamp,
                ..
            } => Self::format_user_left(username, *timestamp),
            ServerFrame::Server {
                content, timestamp, ..
            } => Self::format_server_notice(content, *timestamp),
            ServerFrame::Error { code, message } => Self::format_error(code, message),
        }
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `from` - The username of the sender
    /// * `content` - The message content
    /// * `sent_at` - Unix timestamp assigned by the room (milliseconds)
    /// * `is_me` - Whether the sender is the current user
    pub fn format_chat_message(from: &str, content: &str, sent_at: i64, is_me: bool) -> String {
        let me_suffix = if is_me { " (me)" } else { "" };
        format!(
            "\n\n{RULE}\n[{}] @{}{}: {}\n{RULE}\n",
            hms(sent_at),
            from,
            me_suffix,
            content
        )
    }

    /// Format a user-joined notification
    pub fn format_user_joined(username: &str, joined_at: i64) -> String {
        format!("\n+ {} entered at {}\n", username, rfc3339(joined_at))
    }

    /// Format a user-left notification
    pub fn format_user_left(username: &str, left_at: i64) -> String {
        format!("\n- {} left at {}\n", username, rfc3339(left_at))
    }

    /// Format a notice written by the server (welcome etc.)
    pub fn format_server_notice(content: &str, sent_at: i64) -> String {
        format!("\n* [{}] {}\n", hms(sent_at), content)
    }

    /// Format an error addressed to this client
    pub fn format_error(code: &str, message: &str) -> String {
        format!("\n! {} ({})\n", message, code)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
