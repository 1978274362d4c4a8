//! Message formatting utilities for client display.

use relay_server::infrastructure::dto::websocket::{AckStatus, ServerEvent, UserDto};
use relay_shared::time::timestamp_to_rfc3339;

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a server event for the terminal.
    ///
    /// # Arguments
    ///
    /// * `event` - The decoded server frame
    /// * `my_connection_id` - This client's connection id, if already known
    ///
    /// # Returns
    ///
    /// `None` for frames that need no output (successful acks)
    pub fn format_event(event: &ServerEvent, my_connection_id: Option<&str>) -> Option<String> {
        let is_me = |connection_id: &str| my_connection_id == Some(connection_id);

        let text = match event {
            ServerEvent::ConnectionStatus {
                status,
                connection_id,
                server_time,
            } => format!(
                "\n{} as {} (server time {})\n",
                status,
                connection_id,
                timestamp_to_rfc3339(*server_time)
            ),
            ServerEvent::ChannelJoined {
                channel_id,
                timestamp,
                active_members,
            } => format!(
                "\n\n============================================================\n\
                 Joined #{} at {} ({} active)\n\
                 ============================================================\n",
                channel_id,
                timestamp_to_rfc3339(*timestamp),
                active_members
            ),
            ServerEvent::UserJoined {
                channel_id,
                connection_id,
                user,
                timestamp,
                active_members,
            } => format!(
                "\n+ {} joined #{} at {} ({} active)\n",
                Self::display_name(user.as_ref(), connection_id),
                channel_id,
                timestamp_to_rfc3339(*timestamp),
                active_members
            ),
            ServerEvent::UserLeft {
                channel_id,
                connection_id,
                user,
                timestamp,
                active_members,
            } => format!(
                "\n- {} left #{} at {} ({} active)\n",
                Self::display_name(user.as_ref(), connection_id),
                channel_id,
                timestamp_to_rfc3339(*timestamp),
                active_members
            ),
            ServerEvent::ChatMessage {
                channel_id,
                content,
                connection_id,
                user,
                timestamp,
                ..
            } => {
                let me_suffix = if is_me(connection_id) { " (me)" } else { "" };
                format!(
                    "\n\n{}\n#{} @{}{}: {}\nsent at {}\n{}\n",
                    RULE,
                    channel_id,
                    Self::display_name(user.as_ref(), connection_id),
                    me_suffix,
                    content,
                    timestamp_to_rfc3339(*timestamp),
                    RULE
                )
            }
            ServerEvent::Typing {
                connection_id,
                user,
                is_typing,
                ..
            } => {
                let verb = if *is_typing {
                    "is typing..."
                } else {
                    "stopped typing"
                };
                format!(
                    "\n~ {} {}\n",
                    Self::display_name(user.as_ref(), connection_id),
                    verb
                )
            }
            ServerEvent::ReadStatus {
                channel_id,
                connection_id,
                user,
                timestamp,
            } => format!(
                "\n~ {} read #{} up to {}\n",
                Self::display_name(user.as_ref(), connection_id),
                channel_id,
                timestamp_to_rfc3339(*timestamp)
            ),
            ServerEvent::Ack(ack) => match ack.status {
                AckStatus::Success => return None,
                AckStatus::Error => format!(
                    "\n! {} failed: {}\n",
                    ack.event,
                    ack.message.as_deref().unwrap_or("unknown error")
                ),
            },
        };

        Some(text)
    }

    /// Best human-readable label for a sender.
    pub fn display_name(user: Option<&UserDto>, connection_id: &str) -> String {
        match user {
            Some(UserDto { name: Some(name), .. }) => name.clone(),
            Some(UserDto { id: Some(id), .. }) => format!("user {}", id),
            _ => connection_id.to_string(),
        }
    }

    /// Format a frame that is not a known server event
    pub fn format_raw_message(text: &str) -> String {
        format!("\n{}\n", text)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\nReceived binary data: {} bytes\n", byte_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_server::infrastructure::dto::websocket::AckDto;

    fn alice() -> Option<UserDto> {
        Some(UserDto {
            id: Some(1),
            name: Some("alice".to_string()),
            email: None,
        })
    }

    #[test]
    fn test_format_chat_message_marks_own_messages() {
        // テスト項目: 自分のメッセージには (me) が付き、他人のメッセージには付かない
        // given (前提条件):
        let event = ServerEvent::ChatMessage {
            message_id: "m1".to_string(),
            channel_id: "general".to_string(),
            content: "hello".to_string(),
            connection_id: "c1".to_string(),
            user: alice(),
            timestamp: 0,
        };

        // when (操作):
        let mine = MessageFormatter::format_event(&event, Some("c1")).unwrap();
        let theirs = MessageFormatter::format_event(&event, Some("c2")).unwrap();

        // then (期待する結果):
        assert!(mine.contains("#general @alice (me): hello"));
        assert!(theirs.contains("#general @alice: hello"));
        assert!(theirs.contains("sent at 1970-01-01T00:00:00+00:00"));
    }

    #[test]
    fn test_format_presence_events() {
        // テスト項目: 入退室通知に名前とアクティブ人数が表示される
        // given (前提条件):
        let joined = ServerEvent::UserJoined {
            channel_id: "42".to_string(),
            connection_id: "c2".to_string(),
            user: alice(),
            timestamp: 0,
            active_members: 2,
        };
        let left = ServerEvent::UserLeft {
            channel_id: "42".to_string(),
            connection_id: "c2".to_string(),
            user: None,
            timestamp: 0,
            active_members: 1,
        };

        // when (操作):
        let joined = MessageFormatter::format_event(&joined, None).unwrap();
        let left = MessageFormatter::format_event(&left, None).unwrap();

        // then (期待する結果):
        assert!(joined.contains("+ alice joined #42"));
        assert!(joined.contains("(2 active)"));
        assert!(left.contains("- c2 left #42"));
        assert!(left.contains("(1 active)"));
    }

    #[test]
    fn test_successful_ack_is_silent() {
        // テスト項目: 成功 ack は表示されず、エラー ack は理由付きで表示される
        // given (前提条件):
        let ok = ServerEvent::Ack(AckDto::success("chat_message", None));
        let failed = ServerEvent::Ack(AckDto::error(
            "join_channel",
            None,
            "channel_id is required",
        ));

        // when (操作):
        let ok = MessageFormatter::format_event(&ok, None);
        let failed = MessageFormatter::format_event(&failed, None).unwrap();

        // then (期待する結果):
        assert!(ok.is_none());
        assert!(failed.contains("join_channel failed: channel_id is required"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        // テスト項目: 名前がなければユーザー ID、それもなければ接続 ID を表示する
        // given (前提条件):
        let id_only = UserDto {
            id: Some(9),
            name: None,
            email: None,
        };

        // then (期待する結果):
        assert_eq!(MessageFormatter::display_name(alice().as_ref(), "c1"), "alice");
        assert_eq!(MessageFormatter::display_name(Some(&id_only), "c1"), "user 9");
        assert_eq!(MessageFormatter::display_name(None, "c1"), "c1");
    }
}
