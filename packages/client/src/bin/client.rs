//! Terminal chat client with reconnection support.
//!
//! Connects to a room of the chat server, joins with the given username and sends
//! every typed line as a chat message. `/leave` leaves the room, `/quit` exits.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//! A refused username (duplicate or invalid) ends the client with status 1.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-client -- --username alice
//! cargo run --bin parlor-client -- -n bob -u ws://127.0.0.1:8080/ws/lobby
//! ```

use clap::Parser;

use parlor_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "parlor-client")]
#[command(about = "Terminal chat client for per-room chat server", long_about = None)]
struct Args {
    /// Username to join with (must be unique within the room)
    #[arg(short = 'n', long)]
    username: String,

    /// WebSocket URL of the room
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws/lobby")]
    url: String,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the client
    if let Err(e) = parlor_client::run_client(args.url, args.username).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
