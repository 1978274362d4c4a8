//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの送信キュー（`UnboundedSender`）を管理
//! - ドメインの `Notification` を JSON フレームにエンコードして送信
//!
//! ## 設計ノート
//!
//! 送信キューの生成は UI 層（`ui/handler/websocket.rs`）で行われ、キューの先では
//! 接続ごとのタスクがソケットへ書き出します。ここでの送信はブロックしないため、
//! 遅い受信者が他の受信者への配信を止めることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, Notification, PusherChannel},
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信キュー
    connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { connections }
    }

    fn encode(notification: &Notification) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(notification.clone()))
            .map_err(|e| MessagePushError::Encode(e.to_string()))
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        connections.insert(connection_id, sender);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered from MessagePusher",
                connection_id
            );
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(notification)?;
        let connections = self.connections.lock().await;

        let sender = connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!(
            "Pushed {} to connection '{}'",
            notification.event_name(),
            connection_id
        );
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        notification: &Notification,
    ) -> Result<usize, MessagePushError> {
        let frame = Self::encode(notification)?;
        let connections = self.connections.lock().await;

        let mut delivered = 0;
        for target in targets {
            let Some(sender) = connections.get(target) else {
                tracing::warn!(
                    "Connection '{}' not found during broadcast of {}, skipping",
                    target,
                    notification.event_name()
                );
                continue;
            };
            // ブロードキャストでは一部の送信失敗を許容
            match sender.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    "Failed to push {} to connection '{}': {}",
                    notification.event_name(),
                    target,
                    e
                ),
            }
        }

        tracing::debug!(
            "Broadcasted {} to {}/{} connection(s)",
            notification.event_name(),
            delivered,
            targets.len()
        );
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelId, Timestamp};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - WebSocketMessagePusher の送信キューへの書き込み
    // - push_to: 特定の接続への送信
    // - broadcast: 複数接続への送信と部分失敗の許容
    //
    // 【なぜこのテストが必要か】
    // - MessagePusher は UseCase から呼ばれる通信層の中核
    // - 1 つの受信者の失敗が他の受信者への配信を妨げないことを保証する
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn joined() -> Notification {
        Notification::ChannelJoined {
            channel_id: ChannelId::new("42".to_string()).unwrap(),
            timestamp: Timestamp::new(1000),
            active_members: 1,
        }
    }

    #[tokio::test]
    async fn test_push_to_encodes_frame() {
        // テスト項目: 通知が JSON フレームとして送信キューに書き込まれる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx).await;

        // when (操作):
        let result = pusher.push_to(&conn("c1"), &joined()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["type"], "channel_joined");
        assert_eq!(frame["channel_id"], "42");
        assert_eq!(frame["active_members"], 1);
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection() {
        // テスト項目: 未登録の接続への送信はエラー
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();

        // when (操作):
        let result = pusher.push_to(&conn("ghost"), &joined()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ConnectionNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_partial_failure() {
        // テスト項目: 一部の受信者が閉じていても残りの受信者には届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx1).await;
        pusher.register_connection(conn("c2"), tx2).await;
        pusher.register_connection(conn("c3"), tx3).await;
        drop(rx2);

        // when (操作):
        let delivered = pusher
            .broadcast(&[conn("c1"), conn("c2"), conn("c3"), conn("ghost")], &joined())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert!(rx1.recv().await.is_some());
        assert!(rx3.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        // テスト項目: 登録解除後の接続には送信されない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx).await;

        // when (操作):
        pusher.unregister_connection(&conn("c1")).await;
        let delivered = pusher.broadcast(&[conn("c1")], &joined()).await.unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 0);
        assert!(rx.recv().await.is_none());
    }
}
