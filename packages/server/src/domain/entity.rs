//! Entities of the relay domain.

use std::collections::BTreeSet;

use super::value_object::{ChannelId, ConnectionId, MessageId, Timestamp};

/// Caller-supplied identity of the user behind a connection.
///
/// The relay never verifies these claims; authentication is an upstream concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityClaims {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl IdentityClaims {
    pub fn new(id: Option<i64>, name: Option<String>, email: Option<String>) -> Self {
        Self { id, name, email }
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("user#{}", id),
            (None, None) => "anonymous".to_string(),
        }
    }
}

/// Advisory transport metadata captured at connect time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportMetadata {
    pub origin: Option<String>,
    pub user_agent: Option<String>,
}

/// One live client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// Attached on the first successful channel join
    pub identity: Option<IdentityClaims>,
    pub connected_at: Timestamp,
    pub transport: TransportMetadata,
    /// Channels this connection has joined
    pub channels: BTreeSet<ChannelId>,
}

impl Connection {
    pub fn new(id: ConnectionId, transport: TransportMetadata, connected_at: Timestamp) -> Self {
        Self {
            id,
            identity: None,
            connected_at,
            transport,
            channels: BTreeSet::new(),
        }
    }

    pub fn has_joined(&self, channel_id: &ChannelId) -> bool {
        self.channels.contains(channel_id)
    }
}

/// What a relayed event carries besides its routing data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Chat { message_id: MessageId, content: String },
    Typing { is_typing: bool },
    ReadStatus,
}

/// A validated client event on its way to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
    pub kind: EventKind,
    pub channel_id: ChannelId,
    pub sender: ConnectionId,
    pub user: Option<IdentityClaims>,
    pub timestamp: Timestamp,
}

impl EventEnvelope {
    /// Whether the sender receives its own event.
    ///
    /// Typing indicators are only interesting to the other members.
    pub fn includes_sender(&self) -> bool {
        !matches!(self.kind, EventKind::Typing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_connection_has_no_identity_and_no_channels() {
        // テスト項目: 新規接続は identity もチャンネルも持たない
        // given (前提条件):
        let id = ConnectionId::new("c1".to_string()).unwrap();

        // when (操作):
        let connection = Connection::new(id.clone(), TransportMetadata::default(), Timestamp::new(1));

        // then (期待する結果):
        assert_eq!(connection.id, id);
        assert!(connection.identity.is_none());
        assert!(connection.channels.is_empty());
    }

    #[test]
    fn test_identity_label() {
        // テスト項目: ログ用ラベルは name > id > anonymous の優先順で決まる
        // given (前提条件):
        let named = IdentityClaims::new(Some(1), Some("alice".to_string()), None);
        let numbered = IdentityClaims::new(Some(7), None, None);
        let empty = IdentityClaims::default();

        // then (期待する結果):
        assert_eq!(named.label(), "alice");
        assert_eq!(numbered.label(), "user#7");
        assert_eq!(empty.label(), "anonymous");
    }

    #[test]
    fn test_typing_excludes_sender() {
        // テスト項目: typing だけが送信者を配信対象から外す
        // given (前提条件):
        let envelope = |kind| EventEnvelope {
            kind,
            channel_id: ChannelId::new("k".to_string()).unwrap(),
            sender: ConnectionId::new("c1".to_string()).unwrap(),
            user: None,
            timestamp: Timestamp::new(1),
        };
        let chat = envelope(EventKind::Chat {
            message_id: MessageId::new("m1".to_string()).unwrap(),
            content: "hi".to_string(),
        });

        // then (期待する結果):
        assert!(chat.includes_sender());
        assert!(envelope(EventKind::ReadStatus).includes_sender());
        assert!(!envelope(EventKind::Typing { is_typing: true }).includes_sender());
    }
}
