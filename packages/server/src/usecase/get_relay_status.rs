//! UseCase: リレー状態の参照（ヘルスチェック / デバッグ用スナップショット）
//!
//! 読み取り専用のため EventLoop のターンは取らない。

use std::sync::Arc;

use relay_shared::time::Clock;

use crate::domain::{ChannelRoster, RelayRepository, Timestamp};

use super::{error::RelayError, require_channel_id};

/// Liveness snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayHealth {
    pub connections: usize,
    pub channels: usize,
    pub server_time: Timestamp,
}

/// リレー状態参照のユースケース
pub struct GetRelayStatusUseCase {
    repository: Arc<dyn RelayRepository>,
    clock: Arc<dyn Clock>,
}

impl GetRelayStatusUseCase {
    pub fn new(repository: Arc<dyn RelayRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn health(&self) -> RelayHealth {
        RelayHealth {
            connections: self.repository.count_connections().await,
            channels: self.repository.count_channels().await,
            server_time: Timestamp::new(self.clock.now_millis()),
        }
    }

    /// Every channel with its members, ordered by channel id.
    pub async fn channel_rosters(&self) -> Vec<ChannelRoster> {
        self.repository.rosters().await
    }

    /// One channel's members. Unknown channels yield an empty roster.
    pub async fn channel_roster(&self, channel_id: String) -> Result<ChannelRoster, RelayError> {
        let channel_id = require_channel_id(Some(channel_id))?;
        Ok(self.repository.roster(&channel_id).await)
    }

    pub async fn connection_count(&self) -> usize {
        self.repository.count_connections().await
    }

    /// Whether the registry and the membership index agree.
    pub async fn is_consistent(&self) -> bool {
        self.repository.is_consistent().await
    }
}
