//! Channel Membership Index: channel id → connection ids currently joined.

use std::collections::{BTreeMap, BTreeSet};

use super::value_object::{ChannelId, ConnectionId};

/// Live roster of every channel.
///
/// A channel exists in the index only while it has at least one member.
#[derive(Debug, Default, Clone)]
pub struct ChannelMembershipIndex {
    channels: BTreeMap<ChannelId, BTreeSet<ConnectionId>>,
}

impl ChannelMembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a channel, creating the channel if needed.
    ///
    /// Returns the resulting member count.
    pub fn join(&mut self, channel_id: ChannelId, connection_id: ConnectionId) -> usize {
        let members = self.channels.entry(channel_id).or_default();
        members.insert(connection_id);
        members.len()
    }

    /// Remove a connection from a channel, dropping the channel once empty.
    ///
    /// Returns the resulting member count (0 if the channel no longer exists).
    pub fn leave(&mut self, channel_id: &ChannelId, connection_id: &ConnectionId) -> usize {
        let Some(members) = self.channels.get_mut(channel_id) else {
            return 0;
        };
        members.remove(connection_id);
        let remaining = members.len();
        if remaining == 0 {
            self.channels.remove(channel_id);
        }
        remaining
    }

    /// Members of a channel (empty for unknown channels).
    pub fn members_of(&self, channel_id: &ChannelId) -> BTreeSet<ConnectionId> {
        self.channels.get(channel_id).cloned().unwrap_or_default()
    }

    pub fn is_member(&self, channel_id: &ChannelId, connection_id: &ConnectionId) -> bool {
        self.channels
            .get(channel_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn member_count(&self, channel_id: &ChannelId) -> usize {
        self.channels.get(channel_id).map_or(0, BTreeSet::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChannelId, &BTreeSet<ConnectionId>)> {
        self.channels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(id: &str) -> ChannelId {
        ChannelId::new(id.to_string()).unwrap()
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_join_creates_channel_and_counts_members() {
        // テスト項目: 初回 join でチャンネルが作成され、メンバー数が返される
        // given (前提条件):
        let mut index = ChannelMembershipIndex::new();

        // when (操作):
        let first = index.join(ch("general"), conn("c1"));
        let second = index.join(ch("general"), conn("c2"));
        let duplicate = index.join(ch("general"), conn("c2"));

        // then (期待する結果):
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(duplicate, 2);
        assert_eq!(index.channel_count(), 1);
        assert_eq!(index.member_count(&ch("general")), 2);
    }

    #[test]
    fn test_leave_removes_empty_channel() {
        // テスト項目: 最後のメンバーが抜けるとチャンネル自体が削除される
        // given (前提条件):
        let mut index = ChannelMembershipIndex::new();
        index.join(ch("k"), conn("c1"));
        index.join(ch("k"), conn("c2"));

        // when (操作):
        let after_first = index.leave(&ch("k"), &conn("c1"));
        let after_second = index.leave(&ch("k"), &conn("c2"));

        // then (期待する結果):
        assert_eq!(after_first, 1);
        assert_eq!(after_second, 0);
        assert_eq!(index.channel_count(), 0);
        assert!(index.members_of(&ch("k")).is_empty());
    }

    #[test]
    fn test_leave_unknown_channel_returns_zero() {
        // テスト項目: 存在しないチャンネルからの leave は 0 を返す
        // given (前提条件):
        let mut index = ChannelMembershipIndex::new();

        // when (操作):
        let remaining = index.leave(&ch("nowhere"), &conn("c1"));

        // then (期待する結果):
        assert_eq!(remaining, 0);
        assert_eq!(index.channel_count(), 0);
    }

    #[test]
    fn test_leave_by_non_member_keeps_channel() {
        // テスト項目: メンバーでない接続の leave はチャンネルに影響しない
        // given (前提条件):
        let mut index = ChannelMembershipIndex::new();
        index.join(ch("k"), conn("c1"));

        // when (操作):
        let remaining = index.leave(&ch("k"), &conn("c2"));

        // then (期待する結果):
        assert_eq!(remaining, 1);
        assert!(index.is_member(&ch("k"), &conn("c1")));
    }

    #[test]
    fn test_members_of_unknown_channel_is_empty() {
        // テスト項目: 未知のチャンネルのメンバーは空集合
        // given (前提条件):
        let index = ChannelMembershipIndex::new();

        // then (期待する結果):
        assert!(index.members_of(&ch("unknown")).is_empty());
        assert_eq!(index.member_count(&ch("unknown")), 0);
    }
}
