//! Conversion logic between DTOs and domain types.

use serde_json::Value;

use crate::domain::{ChannelRoster, Connection, IdentityClaims, Notification, PresenceChange};
use crate::infrastructure::dto::{http, websocket as dto};
use crate::usecase::RelayHealth;

// ========================================
// DTO → Domain
// ========================================

impl From<dto::UserDto> for IdentityClaims {
    fn from(dto: dto::UserDto) -> Self {
        Self::new(dto.id, dto.name, dto.email)
    }
}

/// Read identity claims out of a free-form `user_info` object.
///
/// Clients are inconsistent about field types, so numeric strings are
/// accepted for `id` and `username` is accepted for `name`. Returns `None`
/// when nothing usable is present.
pub fn identity_from_user_info(user_info: &Value) -> Option<IdentityClaims> {
    let object = user_info.as_object()?;

    let id = object
        .get("id")
        .or_else(|| object.get("user_id"))
        .and_then(|id| match id {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        });
    let text_field = |keys: &[&str]| {
        keys.iter()
            .filter_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    };
    let name = text_field(&["name", "username"]);
    let email = text_field(&["email"]);

    if id.is_none() && name.is_none() && email.is_none() {
        return None;
    }
    Some(IdentityClaims::new(id, name, email))
}

// ========================================
// Domain → DTO
// ========================================

impl From<IdentityClaims> for dto::UserDto {
    fn from(identity: IdentityClaims) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
        }
    }
}

fn user(identity: Option<IdentityClaims>) -> Option<dto::UserDto> {
    identity.map(dto::UserDto::from)
}

impl From<Notification> for dto::ServerEvent {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::ConnectionStatus {
                connection_id,
                server_time,
            } => Self::ConnectionStatus {
                status: "connected".to_string(),
                connection_id: connection_id.into_string(),
                server_time: server_time.value(),
            },
            Notification::ChannelJoined {
                channel_id,
                timestamp,
                active_members,
            } => Self::ChannelJoined {
                channel_id: channel_id.into_string(),
                timestamp: timestamp.value(),
                active_members,
            },
            Notification::UserJoined(PresenceChange {
                channel_id,
                connection_id,
                user: identity,
                timestamp,
                active_members,
            }) => Self::UserJoined {
                channel_id: channel_id.into_string(),
                connection_id: connection_id.into_string(),
                user: user(identity),
                timestamp: timestamp.value(),
                active_members,
            },
            Notification::UserLeft(PresenceChange {
                channel_id,
                connection_id,
                user: identity,
                timestamp,
                active_members,
            }) => Self::UserLeft {
                channel_id: channel_id.into_string(),
                connection_id: connection_id.into_string(),
                user: user(identity),
                timestamp: timestamp.value(),
                active_members,
            },
            Notification::ChatMessage {
                message_id,
                channel_id,
                content,
                sender,
                user: identity,
                timestamp,
            } => Self::ChatMessage {
                message_id: message_id.into_string(),
                channel_id: channel_id.into_string(),
                content,
                connection_id: sender.into_string(),
                user: user(identity),
                timestamp: timestamp.value(),
            },
            Notification::Typing {
                channel_id,
                sender,
                user: identity,
                is_typing,
                timestamp,
            } => Self::Typing {
                channel_id: channel_id.into_string(),
                connection_id: sender.into_string(),
                user: user(identity),
                is_typing,
                timestamp: timestamp.value(),
            },
            Notification::ReadStatus {
                channel_id,
                sender,
                user: identity,
                timestamp,
            } => Self::ReadStatus {
                channel_id: channel_id.into_string(),
                connection_id: sender.into_string(),
                user: user(identity),
                timestamp: timestamp.value(),
            },
        }
    }
}

impl From<Connection> for http::ChannelMemberDto {
    fn from(connection: Connection) -> Self {
        Self {
            connection_id: connection.id.into_string(),
            user: user(connection.identity),
            connected_at: connection.connected_at.value(),
        }
    }
}

impl From<ChannelRoster> for http::ChannelStatusDto {
    fn from(roster: ChannelRoster) -> Self {
        Self {
            channel_id: roster.channel_id.into_string(),
            member_count: roster.members.len(),
            members: roster.members.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RelayHealth> for http::HealthDto {
    fn from(health: RelayHealth) -> Self {
        Self {
            status: "ok".to_string(),
            connections: health.connections,
            channels: health.channels,
            server_time: health.server_time.value(),
        }
    }
}

impl http::DebugChannelsDto {
    pub fn from_rosters(
        rosters: Vec<ChannelRoster>,
        total_connections: usize,
        consistent: bool,
    ) -> Self {
        Self {
            channels: rosters
                .into_iter()
                .map(|roster| {
                    (
                        roster.channel_id.into_string(),
                        roster.members.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
            total_connections,
            consistent,
        }
    }
}
