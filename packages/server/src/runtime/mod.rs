//! Hosting runtime
//!
//! ルームごとにコーディネーターを 1 つだけ保持し、イベントを 1 つずつ直列に処理させます。
//! アイドル状態のコーディネーターは破棄され、次のイベントで再水和されます。

mod directory;
mod room_host;

pub use directory::{RoomDirectory, RoomSummary};
pub use room_host::RoomHost;
