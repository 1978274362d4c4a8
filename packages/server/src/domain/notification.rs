//! Outbound notifications produced by the relay.
//!
//! Usecases describe *what* to tell a connection; the
//! [`MessagePusher`](super::MessagePusher) implementation decides how it is
//! encoded on the wire.

use super::{
    entity::{EventEnvelope, EventKind, IdentityClaims},
    value_object::{ChannelId, ConnectionId, MessageId, Timestamp},
};

/// Membership change shared by `user_joined` and `user_left`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceChange {
    pub channel_id: ChannelId,
    pub connection_id: ConnectionId,
    pub user: Option<IdentityClaims>,
    pub timestamp: Timestamp,
    pub active_members: usize,
}

/// Every event the relay pushes to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Sent once, right after the transport connects
    ConnectionStatus {
        connection_id: ConnectionId,
        server_time: Timestamp,
    },
    /// Direct reply to a successful join
    ChannelJoined {
        channel_id: ChannelId,
        timestamp: Timestamp,
        active_members: usize,
    },
    UserJoined(PresenceChange),
    UserLeft(PresenceChange),
    ChatMessage {
        message_id: MessageId,
        channel_id: ChannelId,
        content: String,
        sender: ConnectionId,
        user: Option<IdentityClaims>,
        timestamp: Timestamp,
    },
    Typing {
        channel_id: ChannelId,
        sender: ConnectionId,
        user: Option<IdentityClaims>,
        is_typing: bool,
        timestamp: Timestamp,
    },
    ReadStatus {
        channel_id: ChannelId,
        sender: ConnectionId,
        user: Option<IdentityClaims>,
        timestamp: Timestamp,
    },
}

impl Notification {
    /// Wire name of the event, used in logs.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ConnectionStatus { .. } => "connection_status",
            Self::ChannelJoined { .. } => "channel_joined",
            Self::UserJoined(_) => "user_joined",
            Self::UserLeft(_) => "user_left",
            Self::ChatMessage { .. } => "chat_message",
            Self::Typing { .. } => "typing",
            Self::ReadStatus { .. } => "read_status",
        }
    }
}

impl From<EventEnvelope> for Notification {
    fn from(envelope: EventEnvelope) -> Self {
        let EventEnvelope {
            kind,
            channel_id,
            sender,
            user,
            timestamp,
        } = envelope;
        match kind {
            EventKind::Chat {
                message_id,
                content,
            } => Self::ChatMessage {
                message_id,
                channel_id,
                content,
                sender,
                user,
                timestamp,
            },
            EventKind::Typing { is_typing } => Self::Typing {
                channel_id,
                sender,
                user,
                is_typing,
                timestamp,
            },
            EventKind::ReadStatus => Self::ReadStatus {
                channel_id,
                sender,
                user,
                timestamp,
            },
        }
    }
}
