//! Per-room WebSocket chat server.
//!
//! Each room (`/ws/{room_id}`) is served by its own coordinator, evicted when idle
//! and rehydrated from the open connections on the next event.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --host 0.0.0.0 --port 3000 --idle-eviction-secs 60
//! ```

use std::sync::Arc;

use clap::Parser;
use parlor_server::{
    config::{DEFAULT_IDLE_EVICTION_SECS, ServerConfig},
    infrastructure::codec::JsonWireCodec,
    runtime::RoomDirectory,
    ui::Server,
};
use parlor_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "parlor-server")]
#[command(about = "Per-room WebSocket chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds without events before a room's coordinator is evicted
    #[arg(long, default_value_t = DEFAULT_IDLE_EVICTION_SECS)]
    idle_eviction_secs: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Codec / Clock
    // 2. RoomDirectory
    // 3. Server
    let directory = Arc::new(RoomDirectory::new(
        Arc::new(JsonWireCodec),
        Arc::new(SystemClock),
    ));
    let config = ServerConfig::new(args.host, args.port, args.idle_eviction_secs);

    let server = Server::new(config, directory);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
