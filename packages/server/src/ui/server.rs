//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{config::ServerConfig, runtime::RoomDirectory};

use super::{
    handler::{get_room_status, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Build the application router on top of `directory`.
pub fn router(directory: Arc<RoomDirectory>) -> Router {
    let app_state = Arc::new(AppState { directory });

    Router::new()
        // WebSocket エンドポイント
        .route("/ws/{room_id}", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}/status", get(get_room_status))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(config, directory);
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    /// RoomDirectory（ルームごとのコーディネーターのホスト）
    directory: Arc<RoomDirectory>,
}

impl Server {
    pub fn new(config: ServerConfig, directory: Arc<RoomDirectory>) -> Self {
        Self { config, directory }
    }

    /// Bind to the configured address and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let local_addr = listener.local_addr()?;
        let sweeper = self
            .directory
            .clone()
            .spawn_sweeper(self.config.idle_eviction);
        let app = router(self.directory);

        tracing::info!("Chat server listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws/<room_id>", local_addr);
        tracing::info!(
            "Idle coordinators are evicted after {:?}",
            self.config.idle_eviction
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();
        result?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
