//! Connection Registry: the single owner of every live [`Connection`] record.

use std::collections::{BTreeSet, HashMap};

use super::{
    entity::{Connection, IdentityClaims, TransportMetadata},
    value_object::{ChannelId, ConnectionId, Timestamp},
};

/// Registry of live connections keyed by connection id.
///
/// A lookup miss is never an error: events racing a disconnect simply observe
/// `None` and carry on.
#[derive(Debug, Default, Clone)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection with an empty channel set.
    ///
    /// A duplicate id overwrites the previous record (last write wins).
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        transport: TransportMetadata,
        connected_at: Timestamp,
    ) -> Connection {
        let connection = Connection::new(connection_id.clone(), transport, connected_at);
        self.connections.insert(connection_id, connection.clone());
        connection
    }

    /// Overwrite the identity claims of a connection. Unknown ids are ignored.
    pub fn attach_identity(&mut self, connection_id: &ConnectionId, identity: IdentityClaims) {
        match self.connections.get_mut(connection_id) {
            Some(connection) => connection.identity = Some(identity),
            None => tracing::debug!(
                "Ignoring identity update for unknown connection '{}'",
                connection_id
            ),
        }
    }

    /// Remove and return a connection record.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(connection_id)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Mutable access to a connection's joined-channel set.
    ///
    /// Only [`RelayState`](super::RelayState) touches this, so that the index
    /// and the registry are always updated together.
    pub(super) fn channels_mut(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Option<&mut BTreeSet<ChannelId>> {
        self.connections
            .get_mut(connection_id)
            .map(|connection| &mut connection.channels)
    }
}
