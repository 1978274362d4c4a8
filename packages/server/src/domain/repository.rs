//! Repository trait 定義
//!
//! ドメイン層が必要とするリレー状態へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 各メソッドは単独でアトミックです。レジストリとメンバーシップインデックスは
//! 常に一緒に更新されます。

use async_trait::async_trait;

use super::{
    ChannelId, ChannelRoster, Connection, ConnectionId, DisconnectOutcome, IdentityClaims,
    JoinOutcome, LeaveOutcome, RepositoryError, Timestamp, TransportMetadata,
};

/// Relay Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait RelayRepository: Send + Sync {
    /// 接続を登録
    async fn register_connection(
        &self,
        connection_id: ConnectionId,
        transport: TransportMetadata,
        connected_at: Timestamp,
    ) -> Connection;

    /// 接続を取得（存在しなければ None）
    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// identity を付与（存在しない接続は無視）
    async fn attach_identity(&self, connection_id: &ConnectionId, identity: IdentityClaims);

    /// チャンネルに参加
    async fn join_channel(
        &self,
        channel_id: ChannelId,
        connection_id: &ConnectionId,
        identity: Option<IdentityClaims>,
    ) -> Result<JoinOutcome, RepositoryError>;

    /// チャンネルから退出
    async fn leave_channel(
        &self,
        channel_id: &ChannelId,
        connection_id: &ConnectionId,
    ) -> LeaveOutcome;

    /// 全チャンネルから退出して登録解除（未登録なら None）
    async fn disconnect(&self, connection_id: &ConnectionId) -> Option<DisconnectOutcome>;

    /// チャンネルのメンバーを取得（未知のチャンネルは空）
    async fn members_of(&self, channel_id: &ChannelId) -> Vec<ConnectionId>;

    /// 接続数を取得
    async fn count_connections(&self) -> usize;

    /// チャンネル数を取得
    async fn count_channels(&self) -> usize;

    /// チャンネルのメンバー情報を取得
    async fn roster(&self, channel_id: &ChannelId) -> ChannelRoster;

    /// 全チャンネルのメンバー情報を取得
    async fn rosters(&self) -> Vec<ChannelRoster>;

    /// 不変条件が保たれているかを確認
    async fn is_consistent(&self) -> bool;
}
