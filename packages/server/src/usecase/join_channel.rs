//! UseCase: チャンネル参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinChannelUseCase::execute() メソッド
//! - メンバーシップの更新、channel_joined の返信、user_joined のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 参加者本人には channel_joined、他のメンバーには user_joined という通知先の区別
//! - 再参加（すでにメンバー）の場合に user_joined を重複送信しないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：最初のメンバー、2 人目のメンバー
//! - 異常系：channel_id の欠落・空文字、未登録の接続
//! - エッジケース：同じチャンネルへの再参加

use std::sync::Arc;

use relay_shared::time::Clock;

use crate::domain::{
    ConnectionId, IdentityClaims, JoinOutcome, MessagePusher, Notification, PresenceChange,
    RelayRepository, Timestamp,
};

use super::{error::RelayError, event_loop::EventLoop, require_channel_id};

/// チャンネル参加のユースケース
pub struct JoinChannelUseCase {
    repository: Arc<dyn RelayRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    event_loop: Arc<EventLoop>,
    clock: Arc<dyn Clock>,
}

impl JoinChannelUseCase {
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

    /// チャンネルに参加
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `channel_id` - クライアントが指定したチャンネル ID（未検証）
    /// * `identity` - クライアントが名乗るユーザー情報（検証しない）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加後のメンバー数など
    /// * `Err(RelayError)` - channel_id が不正、または接続が未登録
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        channel_id: Option<String>,
        identity: Option<IdentityClaims>,
    ) -> Result<JoinOutcome, RelayError> {
        let channel_id = require_channel_id(channel_id)?;

        let _turn = self.event_loop.turn().await;

        // 1. メンバーシップを更新（identity もここで付与）
        let outcome = self
            .repository
            .join_channel(channel_id, connection_id, identity)
            .await?;
        let timestamp = Timestamp::new(self.clock.now_millis());

        // 2. 参加者本人に channel_joined
        let joined = Notification::ChannelJoined {
            channel_id: outcome.channel_id.clone(),
            timestamp,
            active_members: outcome.active_members,
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &joined).await {
            tracing::warn!("Failed to send channel_joined to '{}': {}", connection_id, e);
        }

        // 3. 他のメンバーに user_joined（再参加なら送らない）
        if outcome.newly_joined && !outcome.others.is_empty() {
            let presence = Notification::UserJoined(PresenceChange {
                channel_id: outcome.channel_id.clone(),
                connection_id: connection_id.clone(),
                user: outcome.identity.clone(),
                timestamp,
                active_members: outcome.active_members,
            });
            if let Err(e) = self
                .message_pusher
                .broadcast(&outcome.others, &presence)
                .await
            {
                tracing::warn!(
                    "Failed to broadcast user_joined in '{}': {}",
                    outcome.channel_id,
                    e
                );
            }
        }

        tracing::info!(
            "Connection '{}' ({}) joined channel '{}' ({} active)",
            connection_id,
            outcome
                .identity
                .as_ref()
                .map_or_else(|| "anonymous".to_string(), IdentityClaims::label),
            outcome.channel_id,
            outcome.active_members
        );
        Ok(outcome)
    }
}
