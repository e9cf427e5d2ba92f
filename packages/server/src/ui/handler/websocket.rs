//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionKey, RoomId, Transport},
    infrastructure::transport::{Outbound, WebSocketTransport},
    runtime::RoomHost,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> RoomId (Domain Model)
    let room_id = match RoomId::new(room_id.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid room id: '{}'", room_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let host = state.directory.get_or_create(&room_id).await;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, host)))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// A close frame ends the loop, which in turn ends the connection.
///
/// # Arguments
///
/// * `rx` - Channel receiver fed by [`WebSocketTransport`]
/// * `sender` - WebSocket sink to send frames to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    let _ = sender.send(Message::Close(Some(frame))).await;
                    break;
                }
            }
        }
    })
}

/// Answer the keep-alive probe directly, or hand the payload to the room.
async fn relay(host: &RoomHost, transport: &WebSocketTransport, payload: String) {
    if let Some(reply) = host.hub().auto_reply(&payload) {
        if let Err(e) = transport.send_text(reply).await {
            tracing::debug!("Failed to answer keep-alive: {}", e);
        }
        return;
    }
    host.dispatch(transport.key(), payload).await;
}

async fn handle_socket(socket: WebSocket, host: Arc<RoomHost>) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let transport = Arc::new(WebSocketTransport::new(tx));
    let key: ConnectionKey = transport.key();

    host.connect(transport.clone()).await;
    tracing::info!("Connection {} opened in room '{}'", key, host.room_id());

    let host_for_recv = host.clone();
    let transport_for_recv = transport.clone();

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on {}: {}", key, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text from {}: {}", key, text.as_str());
                    let payload = text.as_str().to_string();
                    relay(&host_for_recv, &transport_for_recv, payload).await;
                }
                Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => relay(&host_for_recv, &transport_for_recv, text).await,
                    // UTF-8 でないフレームは invalid_payload として本人に返す
                    Err(e) => host_for_recv.reject(key, e.to_string()).await,
                },
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", key);
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // プロトコルレベルの ping/pong は axum が処理する
                }
            }
        }
    });

    // Spawn a task to push frames from the room to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // 開いているうちに通知し、破棄中のルームでもこの接続を再水和させる
    host.disconnect(key).await;
    transport.mark_closed();
    tracing::info!("Connection {} closed in room '{}'", key, host.room_id());
}
