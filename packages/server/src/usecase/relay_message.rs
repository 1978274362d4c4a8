//! UseCase: チャンネルへのイベント中継（チャット / 入力中 / 既読）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase の relay_chat_message / relay_typing_indicator / relay_read_receipt
//! - 配信対象の選定（送信者を含むか）、メッセージ ID とタイムスタンプの付与
//!
//! ### なぜこのテストが必要か
//! - チャットと既読は送信者にも届き、入力中表示は送信者に返さないという配信ルール
//! - クライアントが ID や時刻を省略した場合にリレーが補うこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：各イベントのファンアウト
//! - 異常系：channel_id / content の欠落、未登録の送信者
//! - エッジケース：メンバーのいないチャンネル、空文字のコンテンツ

use std::sync::Arc;

use relay_shared::time::Clock;

use crate::domain::{
    ChannelId, ConnectionId, EventEnvelope, EventKind, MessageId, MessageIdFactory,
    MessagePusher, Notification, RelayRepository, Timestamp,
};

use super::{error::RelayError, event_loop::EventLoop, require_channel_id};

/// Result of one relayed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub channel_id: ChannelId,
    /// Set for chat messages only
    pub message_id: Option<MessageId>,
    pub timestamp: Timestamp,
    /// Connections the event was handed to
    pub recipients: Vec<ConnectionId>,
}

/// チャンネルへのイベント中継のユースケース
pub struct RelayMessageUseCase {
    repository: Arc<dyn RelayRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    event_loop: Arc<EventLoop>,
    clock: Arc<dyn Clock>,
}

impl RelayMessageUseCase {
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

    /// チャットメッセージを中継（送信者を含む全メンバーへ）
    ///
    /// `message_id` と `timestamp` はクライアントが省略した場合にリレーが付与する。
    /// 空文字のコンテンツはそのまま中継する。
    pub async fn relay_chat_message(
        &self,
        sender: &ConnectionId,
        channel_id: Option<String>,
        content: Option<String>,
        message_id: Option<String>,
        timestamp: Option<i64>,
    ) -> Result<DeliveryRecord, RelayError> {
        let channel_id = require_channel_id(channel_id)?;
        let content = content.ok_or(RelayError::MissingContent)?;
        let message_id = match message_id.map(MessageId::new) {
            Some(Ok(message_id)) => message_id,
            _ => MessageIdFactory::generate().map_err(RelayError::IdGeneration)?,
        };

        self.relay(
            sender,
            channel_id,
            EventKind::Chat {
                message_id,
                content,
            },
            timestamp,
        )
        .await
    }

    /// 入力中表示を中継（送信者以外の全メンバーへ）
    pub async fn relay_typing_indicator(
        &self,
        sender: &ConnectionId,
        channel_id: Option<String>,
        is_typing: bool,
    ) -> Result<DeliveryRecord, RelayError> {
        let channel_id = require_channel_id(channel_id)?;
        self.relay(sender, channel_id, EventKind::Typing { is_typing }, None)
            .await
    }

    /// 既読を中継（送信者を含む全メンバーへ）。既読状態はサーバーで保持しない。
    pub async fn relay_read_receipt(
        &self,
        sender: &ConnectionId,
        channel_id: Option<String>,
        timestamp: Option<i64>,
    ) -> Result<DeliveryRecord, RelayError> {
        let channel_id = require_channel_id(channel_id)?;
        self.relay(sender, channel_id, EventKind::ReadStatus, timestamp)
            .await
    }

    async fn relay(
        &self,
        sender: &ConnectionId,
        channel_id: ChannelId,
        kind: EventKind,
        timestamp: Option<i64>,
    ) -> Result<DeliveryRecord, RelayError> {
        let _turn = self.event_loop.turn().await;

        // 1. 送信者を確認し、最新の identity を取得
        let connection = self
            .repository
            .get_connection(sender)
            .await
            .ok_or_else(|| RelayError::UnknownConnection(sender.as_str().to_string()))?;

        let envelope = EventEnvelope {
            kind,
            channel_id,
            sender: sender.clone(),
            user: connection.identity,
            timestamp: Timestamp::new(timestamp.unwrap_or_else(|| self.clock.now_millis())),
        };

        // 2. 配信対象を決定
        let recipients: Vec<ConnectionId> = self
            .repository
            .members_of(&envelope.channel_id)
            .await
            .into_iter()
            .filter(|member| envelope.includes_sender() || member != sender)
            .collect();

        let mut record = DeliveryRecord {
            channel_id: envelope.channel_id.clone(),
            message_id: match &envelope.kind {
                EventKind::Chat { message_id, .. } => Some(message_id.clone()),
                _ => None,
            },
            timestamp: envelope.timestamp,
            recipients: Vec::new(),
        };
        if recipients.is_empty() {
            tracing::debug!(
                "No recipients in channel '{}' for event from '{}'",
                record.channel_id,
                sender
            );
            return Ok(record);
        }

        // 3. ファンアウト
        let notification = Notification::from(envelope);
        if let Err(e) = self
            .message_pusher
            .broadcast(&recipients, &notification)
            .await
        {
            tracing::warn!(
                "Failed to relay {} in '{}': {}",
                notification.event_name(),
                record.channel_id,
                e
            );
        }
        tracing::debug!(
            "Relayed {} from '{}' to {} member(s) of '{}'",
            notification.event_name(),
            sender,
            recipients.len(),
            record.channel_id
        );

        record.recipients = recipients;
        Ok(record)
    }
}
