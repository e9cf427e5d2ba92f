//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{RoomStatusDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms known to the server
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let summaries = state.directory.summaries().await;

    // Runtime のスナップショットから DTO への変換
    let rooms = summaries
        .into_iter()
        .map(|summary| RoomSummaryDto {
            id: summary.room_id.as_str().to_string(),
            open_connections: summary.open_connections,
            resident: summary.resident,
        })
        .collect();

    Json(rooms)
}

/// Get joined-user and history counts of one room
///
/// 未知のルームはルームを作らずに 0 件として返す。
pub async fn get_room_status(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomStatusDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|e| {
        tracing::warn!("Rejected status query: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let Some(host) = state.directory.get(&room_id).await else {
        return Ok(Json(RoomStatusDto {
            connected_users: 0,
            message_history: 0,
        }));
    };

    let status = host.status().await;
    Ok(Json(RoomStatusDto {
        connected_users: status.connected_users,
        message_history: status.message_history,
    }))
}
