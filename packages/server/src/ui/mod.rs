//! Relay server: axum router, WebSocket and HTTP handlers, configuration.

pub mod config;
mod handler;
mod server;
mod signal;
pub mod state;

pub use config::{ConfigError, CorsOrigins, RelayConfig};
pub use server::Server;
