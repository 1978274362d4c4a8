//! Identifier factories.

use uuid::Uuid;

use super::{ConnectionId, MessageId, ValidationError};

/// Generates identifiers for new connections.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a random (UUID v4) connection id
    pub fn generate() -> Result<ConnectionId, ValidationError> {
        ConnectionId::new(Uuid::new_v4().to_string())
    }
}

/// Generates identifiers for chat messages the client did not name.
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a random (UUID v4) message id
    pub fn generate() -> Result<MessageId, ValidationError> {
        MessageId::new(Uuid::new_v4().to_string())
    }
}
