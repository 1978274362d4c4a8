//! Logging setup utilities for the relay binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose logs are enabled by default.
const RELAY_CRATES: [&str; 3] = ["relay_shared", "relay_server", "relay_client"];

/// Build the default `EnvFilter` directive string.
///
/// Every relay crate plus the binary itself logs at `default_log_level`.
/// `tower_http` is included so request traces show up next to relay logs.
pub fn default_directives(binary_name: &str, default_log_level: &str) -> String {
    let mut directives: Vec<String> = RELAY_CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, default_log_level))
        .collect();

    let binary_target = binary_name.replace('-', "_");
    if !RELAY_CRATES.contains(&binary_target.as_str()) {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }
    directives.push(format!("tower_http={}", default_log_level));

    directives.join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "relay-server", "relay-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use relay_shared::logger::setup_logger;
///
/// setup_logger("relay-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_include_relay_crates() {
        // テスト項目: 既定のフィルタに relay 系クレートがすべて含まれる
        // given (前提条件):
        let binary_name = "relay-server";

        // when (操作):
        let directives = default_directives(binary_name, "info");

        // then (期待する結果):
        assert!(directives.contains("relay_shared=info"));
        assert!(directives.contains("relay_server=info"));
        assert!(directives.contains("relay_client=info"));
        assert!(directives.contains("tower_http=info"));
        // バイナリ名はクレート名と同じなので重複しない
        assert_eq!(directives.matches("relay_server=").count(), 1);
    }

    #[test]
    fn test_default_directives_add_unknown_binary() {
        // テスト項目: relay 系以外のバイナリ名はフィルタに追加される
        // given (前提条件):
        let binary_name = "relay-bench";

        // when (操作):
        let directives = default_directives(binary_name, "debug");

        // then (期待する結果):
        assert!(directives.contains("relay_bench=debug"));
    }
}
