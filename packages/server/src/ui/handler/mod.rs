//! Request handlers for the relay server.

mod http;
mod websocket;

pub use http::{debug_channels, get_channel, health_check};
pub use websocket::websocket_handler;
