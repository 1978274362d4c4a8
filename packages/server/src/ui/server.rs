//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectConnectionUseCase, DisconnectConnectionUseCase, GetRelayStatusUseCase,
    JoinChannelUseCase, LeaveChannelUseCase, RelayMessageUseCase,
};

use super::{
    config::RelayConfig,
    handler::{debug_channels, get_channel, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Realtime channel/presence relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_connection_usecase,
///     disconnect_connection_usecase,
///     join_channel_usecase,
///     leave_channel_usecase,
///     relay_message_usecase,
///     get_relay_status_usecase,
///     RelayConfig::default(),
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_connection_usecase: Arc<ConnectConnectionUseCase>,
        disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
        join_channel_usecase: Arc<JoinChannelUseCase>,
        leave_channel_usecase: Arc<LeaveChannelUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        get_relay_status_usecase: Arc<GetRelayStatusUseCase>,
        config: RelayConfig,
    ) -> Self {
        Self {
            app_state: Arc::new(AppState {
                connect_connection_usecase,
                disconnect_connection_usecase,
                join_channel_usecase,
                leave_channel_usecase,
                relay_message_usecase,
                get_relay_status_usecase,
                config,
            }),
        }
    }

    /// Build the router with every endpoint and middleware attached.
    pub fn into_router(self) -> Router {
        let cors = self.app_state.config.cors_layer();

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/channels/{channel_id}", get(get_channel))
            .route("/debug/channels", get(debug_channels))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state)
    }

    /// Run the relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", bind_addr);

        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
