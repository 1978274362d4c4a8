//! Realtime channel/presence relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-server
//! cargo run --bin relay-server -- --host 0.0.0.0 --port 3000 --cors-origins http://localhost:5173
//! ```

use std::{collections::HashMap, sync::Arc, time::Duration};

use clap::Parser;
use relay_server::{
    domain::RelayState,
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRelayRepository},
    ui::{CorsOrigins, RelayConfig, Server},
    usecase::{
        ConnectConnectionUseCase, DisconnectConnectionUseCase, EventLoop, GetRelayStatusUseCase,
        JoinChannelUseCase, LeaveChannelUseCase, RelayMessageUseCase,
    },
};
use relay_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(about = "Realtime channel and presence relay over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "RELAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "RELAY_PORT", default_value = "8080")]
    port: u16,

    /// Allowed browser origins, comma separated ("*" allows any)
    #[arg(long, env = "RELAY_CORS_ORIGINS", default_value = "*")]
    cors_origins: String,

    /// Seconds between server pings
    #[arg(long, env = "RELAY_HEARTBEAT_INTERVAL_SECS", default_value = "25")]
    heartbeat_interval_secs: u64,

    /// Seconds of silence before a connection is dropped
    #[arg(long, env = "RELAY_HEARTBEAT_TIMEOUT_SECS", default_value = "60")]
    heartbeat_timeout_secs: u64,

    /// Largest accepted inbound frame in bytes
    #[arg(long, env = "RELAY_MAX_MESSAGE_SIZE", default_value = "1000000")]
    max_message_size: usize,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl Args {
    fn relay_config(&self) -> Result<RelayConfig, relay_server::ui::ConfigError> {
        RelayConfig {
            cors_origins: CorsOrigins::parse(&self.cors_origins)?,
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
            heartbeat_timeout: Duration::from_secs(self.heartbeat_timeout_secs),
            max_message_size: self.max_message_size,
        }
        .validate()
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match args.relay_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Relay configured (heartbeat every {:?}, timeout {:?}, max message {} bytes)",
        config.heartbeat_interval,
        config.heartbeat_timeout,
        config.max_message_size
    );

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory relay state)
    let state = Arc::new(Mutex::new(RelayState::new()));
    let repository = Arc::new(InMemoryRelayRepository::new(state));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_connections = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_connections));

    // 3. Create UseCases
    let event_loop = Arc::new(EventLoop::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let connect_connection_usecase = Arc::new(ConnectConnectionUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        event_loop.clone(),
        clock.clone(),
    ));
    let disconnect_connection_usecase = Arc::new(DisconnectConnectionUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        event_loop.clone(),
        clock.clone(),
    ));
    let join_channel_usecase = Arc::new(JoinChannelUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        event_loop.clone(),
        clock.clone(),
    ));
    let leave_channel_usecase = Arc::new(LeaveChannelUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        event_loop.clone(),
        clock.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        event_loop.clone(),
        clock.clone(),
    ));
    let get_relay_status_usecase = Arc::new(GetRelayStatusUseCase::new(repository, clock));

    // 4. Create and run the server
    let server = Server::new(
        connect_connection_usecase,
        disconnect_connection_usecase,
        join_channel_usecase,
        leave_channel_usecase,
        relay_message_usecase,
        get_relay_status_usecase,
        config,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
