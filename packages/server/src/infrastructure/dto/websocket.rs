//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object tagged by `"type"`.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Channel id as sent by clients: a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChannelId {
    Text(String),
    Number(serde_json::Number),
}

impl RawChannelId {
    /// Numbers are normalised to their decimal form.
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

impl From<&str> for RawChannelId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Client supplied timestamp: Unix millis or an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Unix millis, or `None` when the text is not RFC 3339.
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            Self::Millis(millis) => Some(*millis),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.timestamp_millis()),
        }
    }
}

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinChannel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<RawChannelId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_info: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    LeaveChannel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<RawChannelId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    ChatMessage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<RawChannelId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<RawTimestamp>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    TypingIndicator {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<RawChannelId>,
        #[serde(default)]
        is_typing: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    ReadStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<RawChannelId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<RawTimestamp>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl ClientEvent {
    /// Wire name echoed in the `ack.event` field.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinChannel { .. } => "join_channel",
            Self::LeaveChannel { .. } => "leave_channel",
            Self::ChatMessage { .. } => "chat_message",
            Self::TypingIndicator { .. } => "typing_indicator",
            Self::ReadStatus { .. } => "read_status",
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::JoinChannel { request_id, .. }
            | Self::LeaveChannel { request_id, .. }
            | Self::ChatMessage { request_id, .. }
            | Self::TypingIndicator { request_id, .. }
            | Self::ReadStatus { request_id, .. } => request_id.as_deref(),
        }
    }
}

/// Identity claims as shown to other members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Success,
    Error,
}

/// Direct reply to one client frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckDto {
    pub event: String,
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_members: Option<usize>,
}

impl AckDto {
    pub fn success(event: &str, request_id: Option<&str>) -> Self {
        Self::new(event, AckStatus::Success, request_id)
    }

    pub fn error(event: &str, request_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(event, AckStatus::Error, request_id)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_channel(mut self, channel_id: impl Into<String>, active_members: usize) -> Self {
        self.channel_id = Some(channel_id.into());
        self.active_members = Some(active_members);
        self
    }

    fn new(event: &str, status: AckStatus, request_id: Option<&str>) -> Self {
        Self {
            event: event.to_string(),
            status,
            request_id: request_id.map(str::to_string),
            message: None,
            message_id: None,
            channel_id: None,
            active_members: None,
        }
    }
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    ConnectionStatus {
        status: String,
        connection_id: String,
        server_time: i64,
    },
    ChannelJoined {
        channel_id: String,
        timestamp: i64,
        active_members: usize,
    },
    UserJoined {
        channel_id: String,
        connection_id: String,
        user: Option<UserDto>,
        timestamp: i64,
        active_members: usize,
    },
    UserLeft {
        channel_id: String,
        connection_id: String,
        user: Option<UserDto>,
        timestamp: i64,
        active_members: usize,
    },
    ChatMessage {
        message_id: String,
        channel_id: String,
        content: String,
        connection_id: String,
        user: Option<UserDto>,
        timestamp: i64,
    },
    Typing {
        channel_id: String,
        connection_id: String,
        user: Option<UserDto>,
        is_typing: bool,
        timestamp: i64,
    },
    ReadStatus {
        channel_id: String,
        connection_id: String,
        user: Option<UserDto>,
        timestamp: i64,
    },
    Ack(AckDto),
}
