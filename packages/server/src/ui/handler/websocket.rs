//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, header},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{sync::mpsc, time};

use crate::{
    domain::{ConnectionId, PusherChannel, TransportMetadata},
    infrastructure::dto::{
        conversion::identity_from_user_info,
        websocket::{AckDto, ClientEvent, RawChannelId, RawTimestamp, ServerEvent},
    },
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let transport = extract_transport_metadata(&headers);

    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, transport))
}

/// Read the advisory transport metadata. Unreadable headers are skipped.
fn extract_transport_metadata(headers: &HeaderMap) -> TransportMetadata {
    let read = |name: header::HeaderName| {
        let value = headers.get(&name)?;
        match value.to_str() {
            Ok(text) => Some(text.to_string()),
            Err(e) => {
                tracing::warn!("Ignoring unreadable '{}' header: {}", name, e);
                None
            }
        }
    };

    TransportMetadata {
        origin: read(header::ORIGIN),
        user_agent: read(header::USER_AGENT),
    }
}

/// Spawns a task that drains the connection's outbound queue into the socket.
///
/// The same task pings the client every `heartbeat_interval`.
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    heartbeat_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ping = time::interval(heartbeat_interval);
        // First tick fires immediately
        ping.tick().await;

        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { break };
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if sender.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, transport: TransportMetadata) {
    let (sender, receiver) = socket.split();

    // Create a channel for this connection to receive frames
    let (tx, rx) = mpsc::unbounded_channel();

    let connection = match state
        .connect_connection_usecase
        .execute(transport, tx.clone())
        .await
    {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!("Failed to register connection: {}", e);
            return;
        }
    };
    let connection_id = connection.id;

    let mut send_task = pusher_loop(rx, sender, state.config.heartbeat_interval);
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        connection_id.clone(),
        tx,
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_connection_usecase
        .execute(&connection_id)
        .await;
}

/// Process inbound frames in arrival order until the client goes away.
///
/// Any frame (including Pong) counts as a sign of life; silence longer than
/// the heartbeat timeout ends the connection.
async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    reply: PusherChannel,
) {
    let heartbeat_timeout = state.config.heartbeat_timeout;

    loop {
        let msg = match time::timeout(heartbeat_timeout, receiver.next()).await {
            Err(_) => {
                tracing::info!(
                    "Connection '{}' missed heartbeat for {:?}, disconnecting",
                    connection_id,
                    heartbeat_timeout
                );
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
            Ok(Some(Ok(msg))) => msg,
        };

        match msg {
            Message::Text(text) => {
                let ack = handle_client_frame(&state, &connection_id, text.as_str()).await;
                match serde_json::to_string(&ServerEvent::Ack(ack)) {
                    Ok(frame) => {
                        if reply.send(frame).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Failed to encode ack: {}", e),
                }
            }
            Message::Binary(data) => {
                tracing::debug!(
                    "Ignoring binary frame ({} bytes) from '{}'",
                    data.len(),
                    connection_id
                );
            }
            Message::Ping(_) | Message::Pong(_) => {
                tracing::trace!("Heartbeat from '{}'", connection_id);
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                break;
            }
        }
    }
}

/// Decode one client frame, run the matching usecase and build the ack.
async fn handle_client_frame(state: &AppState, connection_id: &ConnectionId, text: &str) -> AckDto {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Unparseable frame from '{}': {}", connection_id, e);
            return AckDto::error("unknown", None, format!("invalid frame: {}", e));
        }
    };
    let event_name = event.event_name();
    let request_id = event.request_id().map(str::to_string);
    let request_id = request_id.as_deref();
    tracing::debug!("Received {} from '{}'", event_name, connection_id);

    match event {
        ClientEvent::JoinChannel {
            channel_id,
            user_info,
            ..
        } => {
            let identity = user_info.as_ref().and_then(identity_from_user_info);
            match state
                .join_channel_usecase
                .execute(connection_id, channel_id.map(RawChannelId::into_string), identity)
                .await
            {
                Ok(outcome) => AckDto::success(event_name, request_id)
                    .with_channel(outcome.channel_id.into_string(), outcome.active_members),
                Err(e) => AckDto::error(event_name, request_id, e.to_string()),
            }
        }
        ClientEvent::LeaveChannel { channel_id, .. } => {
            match state
                .leave_channel_usecase
                .execute(connection_id, channel_id.map(RawChannelId::into_string))
                .await
            {
                Ok(outcome) => {
                    let message = if outcome.was_member {
                        "left channel"
                    } else {
                        "not a member of channel"
                    };
                    AckDto::success(event_name, request_id)
                        .with_channel(outcome.channel_id.into_string(), outcome.active_members)
                        .with_message(message)
                }
                Err(e) => AckDto::error(event_name, request_id, e.to_string()),
            }
        }
        ClientEvent::ChatMessage {
            channel_id,
            content,
            message_id,
            timestamp,
            ..
        } => {
            match state
                .relay_message_usecase
                .relay_chat_message(
                    connection_id,
                    channel_id.map(RawChannelId::into_string),
                    content,
                    message_id,
                    timestamp.as_ref().and_then(RawTimestamp::to_millis),
                )
                .await
            {
                Ok(record) => {
                    let ack = AckDto::success(event_name, request_id);
                    match record.message_id {
                        Some(message_id) => ack.with_message_id(message_id.into_string()),
                        None => ack,
                    }
                }
                Err(e) => AckDto::error(event_name, request_id, e.to_string()),
            }
        }
        ClientEvent::TypingIndicator {
            channel_id,
            is_typing,
            ..
        } => {
            match state
                .relay_message_usecase
                .relay_typing_indicator(
                    connection_id,
                    channel_id.map(RawChannelId::into_string),
                    is_typing,
                )
                .await
            {
                Ok(_) => AckDto::success(event_name, request_id),
                Err(e) => AckDto::error(event_name, request_id, e.to_string()),
            }
        }
        ClientEvent::ReadStatus {
            channel_id,
            timestamp,
            ..
        } => {
            match state
                .relay_message_usecase
                .relay_read_receipt(
                    connection_id,
                    channel_id.map(RawChannelId::into_string),
                    timestamp.as_ref().and_then(RawTimestamp::to_millis),
                )
                .await
            {
                Ok(_) => AckDto::success(event_name, request_id),
                Err(e) => AckDto::error(event_name, request_id, e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_transport_metadata() {
        // テスト項目: Origin と User-Agent を取得できる
        // given (前提条件):
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("relay-test/1.0"));

        // when (操作):
        let transport = extract_transport_metadata(&headers);

        // then (期待する結果):
        assert_eq!(transport.origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(transport.user_agent.as_deref(), Some("relay-test/1.0"));
    }

    #[test]
    fn test_extract_transport_metadata_swallows_bad_headers() {
        // テスト項目: 不正なヘッダーや欠落したヘッダーでも失敗しない
        // given (前提条件):
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_bytes(b"agent \xff\xfe").unwrap(),
        );

        // when (操作):
        let transport = extract_transport_metadata(&headers);

        // then (期待する結果):
        assert_eq!(transport, TransportMetadata::default());
    }
}
