//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs (client events, server events, acks)
//! - `http`: HTTP introspection response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
