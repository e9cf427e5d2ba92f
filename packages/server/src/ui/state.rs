//! Server state shared by the handlers.

use std::sync::Arc;

use crate::runtime::RoomDirectory;

/// Shared application state
pub struct AppState {
    /// ルーム ID → RoomHost の対応表
    pub directory: Arc<RoomDirectory>,
}
