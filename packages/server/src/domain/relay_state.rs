//! Combined registry + membership index with the bidirectional invariant.
//!
//! ## Invariants
//!
//! After every operation of [`RelayState`]:
//!
//! - `c ∈ members_of(k)` ⇔ `k ∈ connection(c).channels`
//! - no channel is kept with an empty member set
//!
//! Both structures are private fields, so the only way to mutate them is
//! through the operations below, each of which updates both sides together.

use super::{
    entity::{Connection, IdentityClaims, TransportMetadata},
    error::RepositoryError,
    membership::ChannelMembershipIndex,
    registry::ConnectionRegistry,
    value_object::{ChannelId, ConnectionId, Timestamp},
};

/// Result of a join operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub channel_id: ChannelId,
    /// Member count after the join
    pub active_members: usize,
    /// `false` when the connection was already a member
    pub newly_joined: bool,
    /// Members other than the joiner (audience of `user_joined`)
    pub others: Vec<ConnectionId>,
    /// Identity of the joiner as last attached
    pub identity: Option<IdentityClaims>,
}

/// Result of removing a connection from one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub channel_id: ChannelId,
    pub connection_id: ConnectionId,
    /// `false` when the connection was not a member (nothing changed)
    pub was_member: bool,
    /// Member count after the leave (0 if the channel was dropped)
    pub active_members: usize,
    /// Members still in the channel (audience of `user_left`)
    pub remaining: Vec<ConnectionId>,
    pub identity: Option<IdentityClaims>,
}

/// Result of tearing a connection down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// The removed record, with the channel set it had before teardown
    pub connection: Connection,
    /// One entry per channel the connection was removed from
    pub departures: Vec<LeaveOutcome>,
}

/// Read-only view of one channel and its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRoster {
    pub channel_id: ChannelId,
    pub members: Vec<Connection>,
}

/// Process-local relay state.
#[derive(Debug, Default, Clone)]
pub struct RelayState {
    registry: ConnectionRegistry,
    index: ChannelMembershipIndex,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn index(&self) -> &ChannelMembershipIndex {
        &self.index
    }

    /// Register a connection.
    ///
    /// Re-registering a live id drops the old record's memberships first so
    /// the index never points at channels the new record does not know about.
    pub fn register_connection(
        &mut self,
        connection_id: ConnectionId,
        transport: TransportMetadata,
        connected_at: Timestamp,
    ) -> Connection {
        if self.registry.contains(&connection_id) {
            tracing::warn!(
                "Connection '{}' registered twice; replacing the previous record",
                connection_id
            );
            self.disconnect(&connection_id);
        }
        self.registry.register(connection_id, transport, connected_at)
    }

    pub fn attach_identity(&mut self, connection_id: &ConnectionId, identity: IdentityClaims) {
        self.registry.attach_identity(connection_id, identity);
    }

    /// Add a connection to a channel, attaching `identity` when given.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ConnectionNotFound`] if the connection is not
    /// registered (for instance it disconnected while the request was queued).
    pub fn join_channel(
        &mut self,
        channel_id: ChannelId,
        connection_id: &ConnectionId,
        identity: Option<IdentityClaims>,
    ) -> Result<JoinOutcome, RepositoryError> {
        let Some(channels) = self.registry.channels_mut(connection_id) else {
            return Err(RepositoryError::ConnectionNotFound(
                connection_id.as_str().to_string(),
            ));
        };
        let newly_joined = channels.insert(channel_id.clone());
        let active_members = self.index.join(channel_id.clone(), connection_id.clone());

        if let Some(identity) = identity {
            self.registry.attach_identity(connection_id, identity);
        }

        let others = self
            .index
            .members_of(&channel_id)
            .into_iter()
            .filter(|member| member != connection_id)
            .collect();

        Ok(JoinOutcome {
            channel_id,
            active_members,
            newly_joined,
            others,
            identity: self.identity_of(connection_id),
        })
    }

    /// Remove a connection from a channel.
    ///
    /// Unknown connections and non-members are tolerated and reported with
    /// `was_member == false`.
    pub fn leave_channel(
        &mut self,
        channel_id: &ChannelId,
        connection_id: &ConnectionId,
    ) -> LeaveOutcome {
        let was_member = self
            .registry
            .channels_mut(connection_id)
            .is_some_and(|channels| channels.remove(channel_id));
        let active_members = self.index.leave(channel_id, connection_id);

        LeaveOutcome {
            channel_id: channel_id.clone(),
            connection_id: connection_id.clone(),
            was_member,
            active_members,
            remaining: self.index.members_of(channel_id).into_iter().collect(),
            identity: self.identity_of(connection_id),
        }
    }

    /// Leave every joined channel, then unregister.
    ///
    /// Returns `None` for an unknown connection, which makes a repeated
    /// disconnect a no-op.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<DisconnectOutcome> {
        let joined: Vec<ChannelId> = self
            .registry
            .get(connection_id)?
            .channels
            .iter()
            .cloned()
            .collect();

        let departures = joined
            .iter()
            .map(|channel_id| self.leave_channel(channel_id, connection_id))
            .collect();

        let mut connection = self.registry.unregister(connection_id)?;
        connection.channels = joined.into_iter().collect();

        Some(DisconnectOutcome {
            connection,
            departures,
        })
    }

    pub fn get_connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.registry.get(connection_id)
    }

    pub fn members_of(&self, channel_id: &ChannelId) -> Vec<ConnectionId> {
        self.index.members_of(channel_id).into_iter().collect()
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub fn channel_count(&self) -> usize {
        self.index.channel_count()
    }

    pub fn member_count(&self, channel_id: &ChannelId) -> usize {
        self.index.member_count(channel_id)
    }

    /// Members of one channel with their connection records.
    pub fn roster(&self, channel_id: &ChannelId) -> ChannelRoster {
        ChannelRoster {
            channel_id: channel_id.clone(),
            members: self
                .index
                .members_of(channel_id)
                .iter()
                .filter_map(|member| self.registry.get(member).cloned())
                .collect(),
        }
    }

    /// Rosters of every channel, ordered by channel id.
    pub fn rosters(&self) -> Vec<ChannelRoster> {
        self.index
            .iter()
            .map(|(channel_id, _)| self.roster(channel_id))
            .collect()
    }

    /// Check both membership invariants.
    pub fn is_consistent(&self) -> bool {
        let index_matches_registry = self.index.iter().all(|(channel_id, members)| {
            !members.is_empty()
                && members.iter().all(|member| {
                    self.registry
                        .get(member)
                        .is_some_and(|connection| connection.has_joined(channel_id))
                })
        });
        let registry_matches_index = self.registry.iter().all(|connection| {
            connection
                .channels
                .iter()
                .all(|channel_id| self.index.is_member(channel_id, &connection.id))
        });

        index_matches_registry && registry_matches_index
    }

    fn identity_of(&self, connection_id: &ConnectionId) -> Option<IdentityClaims> {
        self.registry
            .get(connection_id)
            .and_then(|connection| connection.identity.clone())
    }
}
