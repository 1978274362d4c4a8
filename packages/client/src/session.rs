//! WebSocket client session management.

use std::sync::{Arc, Mutex};

use futures_util::{Sink, SinkExt, StreamExt};
use relay_server::infrastructure::dto::websocket::{ClientEvent, ServerEvent};
use relay_shared::time::get_timestamp_millis;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use crate::{
    command::{self, Command},
    error::ClientError,
    formatter::MessageFormatter,
    runner::ClientOptions,
    ui::{prompt, redisplay_prompt},
};

/// Map a handshake failure onto the client error taxonomy
fn classify_connect_error(error: tungstenite::Error) -> ClientError {
    match error {
        tungstenite::Error::Http(response) => {
            ClientError::ConnectionRejected(response.status().to_string())
        }
        tungstenite::Error::Url(e) => ClientError::InvalidUrl(e.to_string()),
        other => ClientError::ConnectionError(other.to_string()),
    }
}

/// Run one WebSocket client session
///
/// Joins `options.channel_id` right after connecting. Returns `Ok(())` when
/// the user quits and an error when the connection is lost.
pub async fn run_client_session(options: &ClientOptions) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(options.url.as_str())
        .await
        .map_err(classify_connect_error)?;

    tracing::info!("Connected to relay server!");
    println!(
        "\nYou are '{}'. Type messages and press Enter to send, /help for commands.\n",
        options.name
    );

    let (mut write, mut read) = ws_stream.split();

    let user_info = command::user_info(&options.name, options.user_id, options.email.as_deref());
    let current_prompt = Arc::new(Mutex::new(prompt(&options.name, &options.channel_id)));

    // Spawn a task to handle incoming frames
    let prompt_for_read = current_prompt.clone();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;
        let mut my_connection_id: Option<String> = None;

        while let Some(message) = read.next().await {
            let formatted = match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => {
                        if let ServerEvent::ConnectionStatus { connection_id, .. } = &event {
                            my_connection_id = Some(connection_id.clone());
                        }
                        MessageFormatter::format_event(&event, my_connection_id.as_deref())
                    }
                    Err(_) => Some(MessageFormatter::format_raw_message(&text)),
                },
                Ok(Message::Binary(data)) => {
                    Some(MessageFormatter::format_binary_message(data.len()))
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => None,
            };

            if let Some(formatted) = formatted {
                print!("{}", formatted);
                if let Ok(prompt) = prompt_for_read.lock() {
                    redisplay_prompt(&prompt);
                }
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_for_readline = current_prompt.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            let prompt = match prompt_for_readline.lock() {
                Ok(prompt) => prompt.clone(),
                Err(_) => break,
            };
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn prompt input into client events
    let name = options.name.clone();
    let mut channel_id = options.channel_id.clone();
    let mut write_task = tokio::spawn(async move {
        if send_event(&mut write, &command::join_event(&channel_id, &user_info))
            .await
            .is_err()
        {
            return true;
        }

        while let Some(line) = input_rx.recv().await {
            let command = match command::parse_command(&line) {
                Ok(command) => command,
                Err(message) => {
                    println!("{}", message);
                    continue;
                }
            };

            let events = match command {
                Command::Chat(content) => vec![command::chat_event(
                    &channel_id,
                    content,
                    get_timestamp_millis(),
                )],
                Command::Typing(is_typing) => vec![command::typing_event(&channel_id, is_typing)],
                Command::Read => vec![command::read_event(&channel_id, get_timestamp_millis())],
                Command::Leave => vec![command::leave_event(&channel_id)],
                Command::Join(next) => {
                    let events = vec![
                        command::leave_event(&channel_id),
                        command::join_event(&next, &user_info),
                    ];
                    channel_id = next;
                    if let Ok(mut prompt) = current_prompt.lock() {
                        *prompt = crate::ui::prompt(&name, &channel_id);
                    }
                    events
                }
                Command::Help => {
                    print!("{}", command::HELP);
                    continue;
                }
                Command::Quit => break,
            };

            for event in &events {
                if send_event(&mut write, event).await.is_err() {
                    return true;
                }
            }
        }

        let _ = write.close().await;
        false
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}

async fn send_event<S>(write: &mut S, event: &ClientEvent) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize {}: {}", event.event_name(), e);
            return Ok(());
        }
    };

    write.send(Message::Text(json.into())).await.map_err(|e| {
        tracing::warn!("Failed to send {}: {}", event.event_name(), e);
    })
}
