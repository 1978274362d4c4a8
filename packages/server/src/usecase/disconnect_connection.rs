//! UseCase: 接続切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//! - 参加中の全チャンネルからの退出と user_left の通知、登録解除
//!
//! ### なぜこのテストが必要か
//! - 切断後にメンバーシップが残らないこと（不変条件の維持）
//! - ソケットのクローズとハートビートのタイムアウトが重なっても安全であること
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数チャンネルに参加中の接続の切断
//! - エッジケース：2 回目の切断、未登録の接続の切断

use std::sync::Arc;

use relay_shared::time::Clock;

use crate::domain::{ConnectionId, DisconnectOutcome, MessagePusher, RelayRepository, Timestamp};

use super::{event_loop::EventLoop, leave_channel::notify_departure};

/// 接続切断のユースケース
pub struct DisconnectConnectionUseCase {
    repository: Arc<dyn RelayRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    event_loop: Arc<EventLoop>,
    clock: Arc<dyn Clock>,
}

impl DisconnectConnectionUseCase {
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

    /// 接続を切断
    ///
    /// 冪等。すでに切断済み、または未登録の接続に対しては何もせず `None` を返す。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<DisconnectOutcome> {
        let _turn = self.event_loop.turn().await;

        // 1. 送信キューを外す（以降この接続には何も送らない）
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        // 2. 全チャンネルから退出して登録解除
        let Some(outcome) = self.repository.disconnect(connection_id).await else {
            tracing::debug!("Connection '{}' already disconnected", connection_id);
            return None;
        };

        // 3. 各チャンネルの残りのメンバーに user_left
        let timestamp = Timestamp::new(self.clock.now_millis());
        for departure in &outcome.departures {
            notify_departure(self.message_pusher.as_ref(), departure, timestamp).await;
        }

        tracing::info!(
            "Connection '{}' disconnected (left {} channel(s))",
            connection_id,
            outcome.departures.len()
        );
        Some(outcome)
    }
}
