//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{
    domain::{attempts_after_failure, should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::{connect_room, run_client_session},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the WebSocket client with reconnection logic
///
/// # Errors
///
/// Returns the last error when the username is refused or reconnection gives up.
pub async fn run_client(url: String, username: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        let (established, outcome) = match connect_room(&url).await {
            Ok(ws_stream) => (true, run_client_session(ws_stream, &username).await),
            Err(e) => (false, Err(e.into())),
        };

        let client_error = match outcome {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                // If the session ended by the user, don't reconnect
                return Ok(());
            }
            Err(error) => match error.downcast::<ClientError>() {
                Ok(client_error) => *client_error,
                Err(other) => ClientError::ConnectionError(other.to_string()),
            },
        };

        if should_exit_immediately(&client_error) {
            tracing::error!("{}", client_error);
            tracing::error!("Cannot join as '{}'. Exiting.", username);
            return Err(Box::new(client_error));
        }

        tracing::warn!("Connection lost: {}", client_error);
        // 一度つながったセッションが切れた場合は試行回数を数え直す
        reconnect_count = attempts_after_failure(reconnect_count, established);

        if !should_attempt_reconnect(&client_error, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
            tracing::error!(
                "Failed to reconnect after {} attempts. Exiting.",
                MAX_RECONNECT_ATTEMPTS
            );
            return Err(Box::new(client_error));
        }

        tracing::info!(
            "Reconnecting in {} seconds... (attempt {}/{})",
            RECONNECT_INTERVAL_SECS,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
    }
}
