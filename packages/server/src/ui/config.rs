//! Relay runtime configuration.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Start-up configuration errors. Any of these aborts start-up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("heartbeat interval must be greater than zero")]
    ZeroHeartbeatInterval,

    #[error("heartbeat timeout ({timeout:?}) must be greater than the heartbeat interval ({interval:?})")]
    HeartbeatTimeoutTooShort {
        interval: Duration,
        timeout: Duration,
    },

    #[error("max message size must be greater than zero")]
    ZeroMaxMessageSize,

    #[error("invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),
}

/// Origins allowed to open connections from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parse a comma separated origin list. `*` (or nothing) allows any origin.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let origins: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect();
        if origins.is_empty() || origins.contains(&"*") {
            return Ok(Self::Any);
        }
        origins
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub cors_origins: CorsOrigins,
    /// How often the server pings each connection
    pub heartbeat_interval: Duration,
    /// Silence after which a connection is considered gone
    pub heartbeat_timeout: Duration,
    /// Largest accepted inbound frame, in bytes
    pub max_message_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            cors_origins: CorsOrigins::Any,
            heartbeat_interval: Duration::from_secs(25),
            heartbeat_timeout: Duration::from_secs(60),
            max_message_size: 1_000_000,
        }
    }
}

impl RelayConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::ZeroHeartbeatInterval);
        }
        if self.heartbeat_timeout <= self.heartbeat_interval {
            return Err(ConfigError::HeartbeatTimeoutTooShort {
                interval: self.heartbeat_interval,
                timeout: self.heartbeat_timeout,
            });
        }
        if self.max_message_size == 0 {
            return Err(ConfigError::ZeroMaxMessageSize);
        }
        Ok(self)
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let allow_origin = match &self.cors_origins {
            CorsOrigins::Any => AllowOrigin::from(Any),
            CorsOrigins::List(origins) => AllowOrigin::list(origins.iter().cloned()),
        };
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET])
            .allow_headers(Any)
    }
}
