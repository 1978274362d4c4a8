//! Parsing of prompt input into relay client events.

use relay_server::infrastructure::dto::websocket::{ClientEvent, RawChannelId, RawTimestamp};
use serde_json::{Map, Value};

pub const HELP: &str = "\
Commands:
  <text>            send a chat message to the current channel
  /join <channel>   leave the current channel and join another one
  /leave            leave the current channel
  /typing on|off    send a typing indicator
  /read             mark the current channel as read
  /help             show this help
  /quit             exit the client
";

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Join(String),
    Leave,
    Typing(bool),
    Read,
    Help,
    Quit,
}

/// Parse one trimmed, non-empty prompt line.
///
/// Anything not starting with `/` is chat. `//text` sends `/text` as chat.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Chat(line.to_string()));
    };
    if rest.starts_with('/') {
        return Ok(Command::Chat(rest.to_string()));
    }

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("join", Some(channel)) => Ok(Command::Join(channel.to_string())),
        ("join", None) => Err("usage: /join <channel>".to_string()),
        ("leave", _) => Ok(Command::Leave),
        ("typing", Some("on")) | ("typing", None) => Ok(Command::Typing(true)),
        ("typing", Some("off")) => Ok(Command::Typing(false)),
        ("typing", Some(other)) => Err(format!("expected 'on' or 'off', got '{}'", other)),
        ("read", _) => Ok(Command::Read),
        ("help", _) => Ok(Command::Help),
        ("quit", _) | ("exit", _) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command '/{}' (try /help)", other)),
    }
}

/// Build the `user_info` object sent with `join_channel`.
pub fn user_info(name: &str, user_id: Option<i64>, email: Option<&str>) -> Value {
    let mut info = Map::new();
    if let Some(id) = user_id {
        info.insert("id".to_string(), Value::from(id));
    }
    info.insert("name".to_string(), Value::from(name));
    if let Some(email) = email {
        info.insert("email".to_string(), Value::from(email));
    }
    Value::Object(info)
}

pub fn join_event(channel_id: &str, user_info: &Value) -> ClientEvent {
    ClientEvent::JoinChannel {
        channel_id: Some(RawChannelId::from(channel_id)),
        user_info: Some(user_info.clone()),
        request_id: None,
    }
}

pub fn leave_event(channel_id: &str) -> ClientEvent {
    ClientEvent::LeaveChannel {
        channel_id: Some(RawChannelId::from(channel_id)),
        request_id: None,
    }
}

pub fn chat_event(channel_id: &str, content: String, now_millis: i64) -> ClientEvent {
    ClientEvent::ChatMessage {
        channel_id: Some(RawChannelId::from(channel_id)),
        content: Some(content),
        message_id: None,
        timestamp: Some(RawTimestamp::Millis(now_millis)),
        request_id: None,
    }
}

pub fn typing_event(channel_id: &str, is_typing: bool) -> ClientEvent {
    ClientEvent::TypingIndicator {
        channel_id: Some(RawChannelId::from(channel_id)),
        is_typing,
        request_id: None,
    }
}

pub fn read_event(channel_id: &str, now_millis: i64) -> ClientEvent {
    ClientEvent::ReadStatus {
        channel_id: Some(RawChannelId::from(channel_id)),
        timestamp: Some(RawTimestamp::Millis(now_millis)),
        request_id: None,
    }
}
