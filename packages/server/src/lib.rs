//! Realtime channel/presence relay.
//!
//! Tracks live WebSocket connections, the channels they join and fans chat,
//! typing and read-receipt events out to every member of a channel.
//!
//! Layers, innermost first:
//!
//! - [`domain`]: relay state, entities and the ports the usecases depend on
//! - [`usecase`]: one usecase per relay operation
//! - [`infrastructure`]: in-memory repository, WebSocket pusher, wire DTOs
//! - [`ui`]: axum server, handlers and configuration

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
