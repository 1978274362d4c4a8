//! UseCase layer: one usecase per relay operation.
//!
//! Every mutating usecase takes a turn on the shared [`EventLoop`] so that the
//! state change and the frames it produces are never interleaved with another
//! operation.

pub mod connect_connection;
pub mod disconnect_connection;
pub mod error;
pub mod event_loop;
pub mod get_relay_status;
pub mod join_channel;
pub mod leave_channel;
pub mod relay_message;

pub use connect_connection::ConnectConnectionUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::RelayError;
pub use event_loop::EventLoop;
pub use get_relay_status::{GetRelayStatusUseCase, RelayHealth};
pub use join_channel::JoinChannelUseCase;
pub use leave_channel::LeaveChannelUseCase;
pub use relay_message::{DeliveryRecord, RelayMessageUseCase};

use crate::domain::ChannelId;

/// Validate a channel id taken from a client frame.
pub(crate) fn require_channel_id(raw: Option<String>) -> Result<ChannelId, RelayError> {
    let raw = raw.ok_or(RelayError::MissingChannelId)?;
    ChannelId::new(raw).map_err(RelayError::InvalidChannelId)
}
