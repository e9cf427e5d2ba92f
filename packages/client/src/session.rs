//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use parlor_server::infrastructure::dto::websocket::{ClientIntentDto, ServerFrame};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::error::ClientError;

use super::{
    domain::{InputCommand, fatal_error, parse_input},
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Close code the server uses after `leave_chat`
const NORMAL_CLOSE: u16 = 1000;

fn encode(intent: &ClientIntentDto) -> Result<Message, ClientError> {
    serde_json::to_string(intent)
        .map(|json| Message::Text(json.into()))
        .map_err(|e| ClientError::ConnectionError(format!("Failed to serialize intent: {}", e)))
}

/// Established connection to a room
pub type RoomStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Open the WebSocket connection to the room at `url`
pub async fn connect_room(url: &str) -> Result<RoomStream, ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server!");
    Ok(ws_stream)
}

/// Run the WebSocket client session on an established connection
///
/// Returns `Ok(())` when the user left or quit, and an error when the connection was
/// lost or the username was refused.
pub async fn run_client_session(
    ws_stream: RoomStream,
    username: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut write, mut read) = ws_stream.split();

    let join = encode(&ClientIntentDto::JoinChat {
        username: username.to_string(),
    })?;
    write
        .send(join)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    println!(
        "\nYou are '{}'. Type messages and press Enter to send. /leave leaves the room, /quit exits.\n",
        username
    );

    let username_for_read = username.to_string();

    // Spawn a task to handle incoming frames
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerFrame>(text.as_str()) {
                        Ok(ServerFrame::Error { code, message }) => {
                            if let Some(error) = fatal_error(&code, &username_for_read, &message)
                            {
                                return Err(error);
                            }
                            print!("{}", MessageFormatter::format_error(&code, &message));
                        }
                        Ok(frame) => {
                            print!(
                                "{}",
                                MessageFormatter::format_frame(&frame, &username_for_read)
                            );
                        }
                        // キープアライブの "pong" など JSON でないフレーム
                        Err(_) => {
                            print!("{}", MessageFormatter::format_raw_message(text.as_str()));
                        }
                    }
                    redisplay_prompt(&username_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&username_for_read);
                }
                Ok(Message::Close(frame)) => {
                    let code = frame.map(|f| u16::from(f.code));
                    if code == Some(NORMAL_CLOSE) {
                        tracing::info!("Left the room");
                        return Ok(());
                    }
                    tracing::info!("Server closed the connection ({:?})", code);
                    return Err(ClientError::ConnectionError(
                        "Connection closed by server".to_string(),
                    ));
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
                _ => {}
            }
        }

        Err(ClientError::ConnectionError("Connection lost".to_string()))
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let username_for_prompt = username.to_string();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", username_for_prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn typed lines into intents
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let frame = match parse_input(&line) {
                InputCommand::Send(content) => encode(&ClientIntentDto::SendMessage { content })?,
                // サーバーが 1000 で閉じるのを読み込みタスクが待つ
                InputCommand::Leave => encode(&ClientIntentDto::LeaveChat {})?,
                InputCommand::Quit => {
                    write.send(Message::Close(None)).await.ok();
                    return Ok(());
                }
            };

            if let Err(e) = write.send(frame).await {
                tracing::warn!("Failed to send message: {}", e);
                return Err(ClientError::ConnectionError(e.to_string()));
            }
        }

        // 入力が閉じた (Ctrl+C / Ctrl+D)
        Ok::<(), ClientError>(())
    });

    // If any one of the tasks completes, abort the other
    let result = tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            read_result
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result
        }
    };

    match result {
        Ok(outcome) => outcome.map_err(Into::into),
        Err(e) => Err(Box::new(ClientError::ConnectionError(e.to_string()))),
    }
}
