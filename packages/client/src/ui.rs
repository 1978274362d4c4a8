//! UI utilities for the client.

use std::io::Write;

pub fn prompt(name: &str, channel_id: &str) -> String {
    format!("{}@{}> ", name, channel_id)
}

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}
