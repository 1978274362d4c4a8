//! InMemory Relay Repository 実装
//!
//! ドメイン層が定義する RelayRepository trait の具体的な実装。
//! `RelayState`（接続レジストリ + チャンネルメンバーシップインデックス）を
//! 1 つの Mutex で保護し、各操作をアトミックに実行します。
//!
//! 状態はプロセスローカルで、永続化されません。プロセスが再起動すると
//! すべての接続とチャンネルは失われ、クライアントは再接続・再参加します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChannelId, ChannelRoster, Connection, ConnectionId, DisconnectOutcome, IdentityClaims,
    JoinOutcome, LeaveOutcome, RelayRepository, RelayState, RepositoryError, Timestamp,
    TransportMetadata,
};

/// インメモリ Relay Repository 実装
pub struct InMemoryRelayRepository {
    /// リレー状態
    state: Arc<Mutex<RelayState>>,
}

impl InMemoryRelayRepository {
    /// 新しい InMemoryRelayRepository を作成
    pub fn new(state: Arc<Mutex<RelayState>>) -> Self {
        Self { state }
    }
}

impl Default for InMemoryRelayRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(RelayState::new())))
    }
}

#[async_trait]
impl RelayRepository for InMemoryRelayRepository {
    async fn register_connection(
        &self,
        connection_id: ConnectionId,
        transport: TransportMetadata,
        connected_at: Timestamp,
    ) -> Connection {
        let mut state = self.state.lock().await;
        state.register_connection(connection_id, transport, connected_at)
    }

    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let state = self.state.lock().await;
        state.get_connection(connection_id).cloned()
    }

    async fn attach_identity(&self, connection_id: &ConnectionId, identity: IdentityClaims) {
        let mut state = self.state.lock().await;
        state.attach_identity(connection_id, identity);
    }

    async fn join_channel(
        &self,
        channel_id: ChannelId,
        connection_id: &ConnectionId,
        identity: Option<IdentityClaims>,
    ) -> Result<JoinOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        state.join_channel(channel_id, connection_id, identity)
    }

    async fn leave_channel(
        &self,
        channel_id: &ChannelId,
        connection_id: &ConnectionId,
    ) -> LeaveOutcome {
        let mut state = self.state.lock().await;
        state.leave_channel(channel_id, connection_id)
    }

    async fn disconnect(&self, connection_id: &ConnectionId) -> Option<DisconnectOutcome> {
        let mut state = self.state.lock().await;
        state.disconnect(connection_id)
    }

    async fn members_of(&self, channel_id: &ChannelId) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state.members_of(channel_id)
    }

    async fn count_connections(&self) -> usize {
        let state = self.state.lock().await;
        state.connection_count()
    }

    async fn count_channels(&self) -> usize {
        let state = self.state.lock().await;
        state.channel_count()
    }

    async fn roster(&self, channel_id: &ChannelId) -> ChannelRoster {
        let state = self.state.lock().await;
        state.roster(channel_id)
    }

    async fn rosters(&self) -> Vec<ChannelRoster> {
        let state = self.state.lock().await;
        state.rosters()
    }

    async fn is_consistent(&self) -> bool {
        let state = self.state.lock().await;
        state.is_consistent()
    }
}
