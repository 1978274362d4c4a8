//! Helpers for in-process end-to-end tests.
//!
//! The relay is wired exactly as the binary does it and served on an
//! ephemeral port; clients talk to it over real WebSocket connections.

#![allow(dead_code)]

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use relay_server::{
    domain::RelayState,
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRelayRepository},
    ui::{RelayConfig, Server},
    usecase::{
        ConnectConnectionUseCase, DisconnectConnectionUseCase, EventLoop, GetRelayStatusUseCase,
        JoinChannelUseCase, LeaveChannelUseCase, RelayMessageUseCase,
    },
};
use relay_shared::time::{Clock, SystemClock};
use serde_json::{Value, json};
use tokio::{net::TcpStream, sync::Mutex, task::JoinHandle, time};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// How long a test waits for an expected frame
pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Helper struct to manage the server task lifecycle
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(RelayConfig::default()).await
    }

    pub async fn start_with(config: RelayConfig) -> Self {
        let repository = Arc::new(InMemoryRelayRepository::new(Arc::new(Mutex::new(
            RelayState::new(),
        ))));
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let event_loop = Arc::new(EventLoop::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let server = Server::new(
            Arc::new(ConnectConnectionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                event_loop.clone(),
                clock.clone(),
            )),
            Arc::new(DisconnectConnectionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                event_loop.clone(),
                clock.clone(),
            )),
            Arc::new(JoinChannelUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                event_loop.clone(),
                clock.clone(),
            )),
            Arc::new(LeaveChannelUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                event_loop.clone(),
                clock.clone(),
            )),
            Arc::new(RelayMessageUseCase::new(
                repository.clone(),
                message_pusher,
                event_loop,
                clock.clone(),
            )),
            Arc::new(GetRelayStatusUseCase::new(repository, clock)),
            config.validate().expect("test config must be valid"),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let router = server.into_router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        TestServer { addr, handle }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET a JSON endpoint
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = reqwest::get(self.http_url(path))
            .await
            .expect("HTTP request failed");
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Helper struct wrapping one WebSocket client
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pub connection_id: String,
}

impl TestClient {
    /// Connect and consume the initial `connection_status` frame
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        let mut client = TestClient {
            stream,
            connection_id: String::new(),
        };

        let status = client.recv_event().await;
        assert_eq!(status["type"], "connection_status");
        assert_eq!(status["status"], "connected");
        client.connection_id = status["connection_id"]
            .as_str()
            .expect("connection_id must be a string")
            .to_string();
        client
    }

    pub async fn send_json(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn send_binary(&mut self, data: Vec<u8>) {
        self.stream
            .send(Message::binary(data))
            .await
            .expect("Failed to send binary frame");
    }

    /// Next JSON frame, skipping control frames
    pub async fn recv_event(&mut self) -> Value {
        match time::timeout(RECV_TIMEOUT, self.next_text()).await {
            Ok(Some(text)) => serde_json::from_str(&text).expect("Server sent invalid JSON"),
            Ok(None) => panic!("Connection closed while waiting for a frame"),
            Err(_) => panic!("Timed out waiting for a frame"),
        }
    }

    /// Next frame of the given type, failing on anything else
    pub async fn expect_event(&mut self, event_type: &str) -> Value {
        let event = self.recv_event().await;
        assert_eq!(event["type"], event_type, "unexpected frame: {}", event);
        event
    }

    /// Assert that nothing arrives within `wait`
    pub async fn expect_silence(&mut self, wait: Duration) {
        if let Ok(Some(text)) = time::timeout(wait, self.next_text()).await {
            panic!("Expected no frame, got: {}", text);
        }
    }

    /// Join a channel and return the `channel_joined` frame (the ack is checked)
    pub async fn join(&mut self, channel_id: Value, name: &str) -> Value {
        self.send_json(json!({
            "type": "join_channel",
            "channel_id": channel_id,
            "user_info": {"id": 1, "name": name},
        }))
        .await;
        let joined = self.expect_event("channel_joined").await;
        let ack = self.expect_event("ack").await;
        assert_eq!(ack["event"], "join_channel");
        assert_eq!(ack["status"], "success");
        joined
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }

    async fn next_text(&mut self) -> Option<String> {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => return Some(text.to_string()),
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
        None
    }
}
