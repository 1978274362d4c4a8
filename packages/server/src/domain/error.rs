//! Domain error types.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("channel_id must not be empty")]
    EmptyChannelId,

    #[error("message_id must not be empty")]
    EmptyMessageId,
}

/// Errors raised by a [`RelayRepository`](super::RelayRepository)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The connection is not (or no longer) registered
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
}

/// Errors raised by a [`MessagePusher`](super::MessagePusher)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// No outbound channel is registered for the connection
    #[error("connection '{0}' has no outbound channel")]
    ConnectionNotFound(String),

    /// The outbound channel is closed
    #[error("push failed: {0}")]
    PushFailed(String),

    /// The notification could not be encoded for the wire
    #[error("failed to encode notification: {0}")]
    Encode(String),
}
