//! Interactive relay client.
//!
//! Connects to the relay, joins a channel and sends whatever is typed at the
//! prompt as chat messages. Slash commands switch channels, send typing
//! indicators and read receipts. Reconnects automatically on disconnection
//! (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-client -- --channel general --name alice
//! cargo run --bin relay-client -- -c 42 -n bob --user-id 2
//! ```

use clap::Parser;

use relay_client::{ClientOptions, run_client};
use relay_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "relay-client")]
#[command(about = "Interactive client for the realtime channel relay", long_about = None)]
struct Args {
    /// Channel to join after connecting
    #[arg(short = 'c', long, default_value = "general")]
    channel: String,

    /// Display name sent as user_info.name
    #[arg(short = 'n', long)]
    name: String,

    /// Numeric user id sent as user_info.id
    #[arg(long)]
    user_id: Option<i64>,

    /// Email sent as user_info.email
    #[arg(long)]
    email: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, env = "RELAY_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let options = ClientOptions {
        url: args.url,
        channel_id: args.channel,
        name: args.name,
        user_id: args.user_id,
        email: args.email,
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
