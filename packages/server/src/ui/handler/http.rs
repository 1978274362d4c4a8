//! HTTP introspection endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{ChannelStatusDto, DebugChannelsDto, HealthDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let health = state.get_relay_status_usecase.health().await;
    Json(health.into())
}

/// Debug endpoint: every channel with its members (for testing purposes)
pub async fn debug_channels(State(state): State<Arc<AppState>>) -> Json<DebugChannelsDto> {
    let usecase = &state.get_relay_status_usecase;
    let rosters = usecase.channel_rosters().await;
    let total_connections = usecase.connection_count().await;
    let consistent = usecase.is_consistent().await;
    if !consistent {
        tracing::error!("Registry and membership index disagree");
    }

    Json(DebugChannelsDto::from_rosters(
        rosters,
        total_connections,
        consistent,
    ))
}

/// Get channel members by ID. Unknown channels have no members.
pub async fn get_channel(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<String>,
) -> Result<Json<ChannelStatusDto>, StatusCode> {
    match state.get_relay_status_usecase.channel_roster(channel_id).await {
        Ok(roster) => Ok(Json(roster.into())),
        Err(e) => {
            tracing::debug!("Rejected channel lookup: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}
