//! UseCase: 接続確立処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectConnectionUseCase::execute() メソッド
//! - 接続 ID の採番、レジストリへの登録、connection_status の送信
//!
//! ### なぜこのテストが必要か
//! - 接続は常に受け入れられなければならない（メタデータが欠けていても）
//! - connection_status は接続直後の最初のフレームとしてクライアントに届く必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続とステータス通知
//! - エッジケース：トランスポートのメタデータが空
//! - エッジケース：ステータス通知の送信に失敗しても接続は成立する

use std::sync::Arc;

use relay_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionIdFactory, MessagePusher, Notification, PusherChannel, RelayRepository,
    Timestamp, TransportMetadata,
};

use super::{error::RelayError, event_loop::EventLoop};

/// 接続確立のユースケース
pub struct ConnectConnectionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    event_loop: Arc<EventLoop>,
    clock: Arc<dyn Clock>,
}

impl ConnectConnectionUseCase {
    /// 新しい ConnectConnectionUseCase を作成
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        event_loop: Arc<EventLoop>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            event_loop,
            clock,
        }
    }

    /// 接続を確立
    ///
    /// # Arguments
    ///
    /// * `transport` - 接続時に取得したトランスポートのメタデータ
    /// * `sender` - この接続の送信キュー
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 登録された接続
    /// * `Err(RelayError)` - 接続 ID の採番に失敗
    pub async fn execute(
        &self,
        transport: TransportMetadata,
        sender: PusherChannel,
    ) -> Result<Connection, RelayError> {
        let _turn = self.event_loop.turn().await;

        // 1. 接続 ID を採番
        let connection_id = ConnectionIdFactory::generate().map_err(RelayError::IdGeneration)?;
        let connected_at = Timestamp::new(self.clock.now_millis());

        // 2. レジストリに登録し、送信キューを紐付ける
        let connection = self
            .repository
            .register_connection(connection_id.clone(), transport, connected_at)
            .await;
        self.message_pusher
            .register_connection(connection_id.clone(), sender)
            .await;

        // 3. connection_status を送信
        let status = Notification::ConnectionStatus {
            connection_id: connection_id.clone(),
            server_time: connected_at,
        };
        if let Err(e) = self.message_pusher.push_to(&connection_id, &status).await {
            tracing::warn!(
                "Failed to send connection_status to '{}': {}",
                connection_id,
                e
            );
        }

        tracing::info!(
            "Connection '{}' established (origin: {:?}, user_agent: {:?})",
            connection_id,
            connection.transport.origin,
            connection.transport.user_agent
        );
        Ok(connection)
    }
}
