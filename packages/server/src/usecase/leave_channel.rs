//! UseCase: チャンネル退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveChannelUseCase::execute() メソッド
//! - 残りのメンバーへの user_left ブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 最後のメンバーが抜けたときにチャンネルが消えること
//! - メンバーでない接続の退出で誤った通知を出さないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：残りのメンバーがいる場合、最後のメンバーの場合
//! - エッジケース：メンバーでない接続からの退出

use std::sync::Arc;

use relay_shared::time::Clock;

use crate::domain::{
    ConnectionId, LeaveOutcome, MessagePusher, Notification, PresenceChange, RelayRepository,
    Timestamp,
};

use super::{error::RelayError, event_loop::EventLoop, require_channel_id};

/// チャンネル退出のユースケース
pub struct LeaveChannelUseCase {
    repository: Arc<dyn RelayRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    event_loop: Arc<EventLoop>,
    clock: Arc<dyn Clock>,
}

impl LeaveChannelUseCase {
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

    /// チャンネルから退出
    ///
    /// メンバーでなかった場合も成功として扱い、通知は行わない。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        channel_id: Option<String>,
    ) -> Result<LeaveOutcome, RelayError> {
        let channel_id = require_channel_id(channel_id)?;

        let _turn = self.event_loop.turn().await;

        let outcome = self
            .repository
            .leave_channel(&channel_id, connection_id)
            .await;
        if !outcome.was_member {
            tracing::debug!(
                "Connection '{}' left channel '{}' without being a member",
                connection_id,
                channel_id
            );
            return Ok(outcome);
        }

        notify_departure(
            self.message_pusher.as_ref(),
            &outcome,
            Timestamp::new(self.clock.now_millis()),
        )
        .await;

        tracing::info!(
            "Connection '{}' left channel '{}' ({} active)",
            connection_id,
            outcome.channel_id,
            outcome.active_members
        );
        Ok(outcome)
    }
}

/// Broadcast `user_left` to the members that remain after a departure.
pub(crate) async fn notify_departure(
    message_pusher: &dyn MessagePusher,
    outcome: &LeaveOutcome,
    timestamp: Timestamp,
) {
    if !outcome.was_member || outcome.remaining.is_empty() {
        return;
    }
    let presence = Notification::UserLeft(PresenceChange {
        channel_id: outcome.channel_id.clone(),
        connection_id: outcome.connection_id.clone(),
        user: outcome.identity.clone(),
        timestamp,
        active_members: outcome.active_members,
    });
    if let Err(e) = message_pusher.broadcast(&outcome.remaining, &presence).await {
        tracing::warn!(
            "Failed to broadcast user_left in '{}': {}",
            outcome.channel_id,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChannelId, IdentityClaims, MockMessagePusher, TransportMetadata},
        infrastructure::repository::InMemoryRelayRepository,
    };
    use relay_shared::time::FixedClock;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn ch(id: &str) -> ChannelId {
        ChannelId::new(id.to_string()).unwrap()
    }

    async fn create_repository(
        members: &[&str],
        channel: &str,
    ) -> Arc<InMemoryRelayRepository> {
        let repository = Arc::new(InMemoryRelayRepository::default());
        for id in members {
            repository
                .register_connection(conn(id), TransportMetadata::default(), Timestamp::new(0))
                .await;
            let identity = IdentityClaims::new(None, Some(id.to_string()), None);
            repository
                .join_channel(ch(channel), &conn(id), Some(identity))
                .await
                .unwrap();
        }
        repository
    }

    fn create_usecase(
        repository: Arc<InMemoryRelayRepository>,
        pusher: MockMessagePusher,
    ) -> LeaveChannelUseCase {
        LeaveChannelUseCase::new(
            repository,
            Arc::new(pusher),
            Arc::new(EventLoop::new()),
            Arc::new(FixedClock::new(5_000)),
        )
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_members() {
        // テスト項目: 退出すると残りのメンバーに user_left が届く
        // given (前提条件):
        let repository = create_repository(&["c1", "c2", "c3"], "k").await;
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .withf(|targets, notification| {
                targets == [conn("c1"), conn("c3")].as_slice()
                    && matches!(
                        notification,
                        Notification::UserLeft(PresenceChange {
                            connection_id,
                            active_members: 2,
                            timestamp,
                            user: Some(_),
                            ..
                        }) if connection_id.as_str() == "c2" && timestamp.value() == 5_000
                    )
            })
            .times(1)
            .returning(|targets, _| Ok(targets.len()));
        let usecase = create_usecase(repository.clone(), pusher);

        // when (操作):
        let outcome = usecase
            .execute(&conn("c2"), Some("k".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.was_member);
        assert_eq!(outcome.active_members, 2);
        assert!(repository.is_consistent().await);
    }

    #[tokio::test]
    async fn test_last_member_leaving_removes_channel() {
        // テスト項目: 最後のメンバーが退出するとチャンネルが消え、通知は発生しない
        // given (前提条件):
        let repository = create_repository(&["c1"], "k").await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = create_usecase(repository.clone(), pusher);

        // when (操作):
        let outcome = usecase
            .execute(&conn("c1"), Some("k".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.active_members, 0);
        assert_eq!(repository.count_channels().await, 0);
        assert!(repository.members_of(&ch("k")).await.is_empty());
    }

    #[tokio::test]
    async fn test_leave_by_non_member_is_silent_success() {
        // テスト項目: メンバーでない接続の退出は成功扱いで、誰にも通知しない
        // given (前提条件):
        let repository = create_repository(&["c1"], "k").await;
        repository
            .register_connection(conn("c2"), TransportMetadata::default(), Timestamp::new(0))
            .await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = create_usecase(repository.clone(), pusher);

        // when (操作):
        let outcome = usecase
            .execute(&conn("c2"), Some("k".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!outcome.was_member);
        assert_eq!(repository.members_of(&ch("k")).await, vec![conn("c1")]);
    }

    #[tokio::test]
    async fn test_leave_without_channel_id() {
        // テスト項目: channel_id がない退出要求はエラー
        // given (前提条件):
        let repository = create_repository(&["c1"], "k").await;
        let usecase = create_usecase(repository, MockMessagePusher::new());

        // when (操作):
        let result = usecase.execute(&conn("c1"), None).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), RelayError::MissingChannelId);
    }
}
