//! Domain layer: relay state, entities, value objects and the ports the
//! usecases depend on.

pub mod entity;
pub mod error;
pub mod factory;
pub mod membership;
pub mod message_pusher;
pub mod notification;
pub mod registry;
pub mod relay_state;
pub mod repository;
pub mod value_object;

pub use entity::{Connection, EventEnvelope, EventKind, IdentityClaims, TransportMetadata};
pub use error::{MessagePushError, RepositoryError, ValidationError};
pub use factory::{ConnectionIdFactory, MessageIdFactory};
pub use membership::ChannelMembershipIndex;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notification::{Notification, PresenceChange};
pub use registry::ConnectionRegistry;
pub use relay_state::{ChannelRoster, DisconnectOutcome, JoinOutcome, LeaveOutcome, RelayState};
pub use repository::RelayRepository;
pub use value_object::{ChannelId, ConnectionId, MessageId, Timestamp};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
