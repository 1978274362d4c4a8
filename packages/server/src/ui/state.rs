//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectConnectionUseCase, DisconnectConnectionUseCase, GetRelayStatusUseCase,
    JoinChannelUseCase, LeaveChannelUseCase, RelayMessageUseCase,
};

use super::config::RelayConfig;

/// Shared application state
pub struct AppState {
    /// ConnectConnectionUseCase（接続確立のユースケース）
    pub connect_connection_usecase: Arc<ConnectConnectionUseCase>,
    /// DisconnectConnectionUseCase（接続切断のユースケース）
    pub disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    /// JoinChannelUseCase（チャンネル参加のユースケース）
    pub join_channel_usecase: Arc<JoinChannelUseCase>,
    /// LeaveChannelUseCase（チャンネル退出のユースケース）
    pub leave_channel_usecase: Arc<LeaveChannelUseCase>,
    /// RelayMessageUseCase（イベント中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// GetRelayStatusUseCase（状態参照のユースケース）
    pub get_relay_status_usecase: Arc<GetRelayStatusUseCase>,
    pub config: RelayConfig,
}
