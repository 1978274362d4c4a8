//! HTTP introspection response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::websocket::UserDto;

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub connections: usize,
    pub channels: usize,
    pub server_time: i64,
}

/// One member of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMemberDto {
    pub connection_id: String,
    pub user: Option<UserDto>,
    pub connected_at: i64,
}

/// `GET /api/channels/{channel_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatusDto {
    pub channel_id: String,
    pub member_count: usize,
    pub members: Vec<ChannelMemberDto>,
}

/// `GET /debug/channels`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugChannelsDto {
    pub channels: BTreeMap<String, Vec<ChannelMemberDto>>,
    pub total_connections: usize,
    /// Whether the registry and the membership index agree
    pub consistent: bool,
}
