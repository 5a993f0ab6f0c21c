//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{ClientSummaryDto, NegotiationStateDto},
    ui::state::AppState,
};
use kakehashi_shared::time::timestamp_to_jst_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of connected clients
pub async fn get_clients(State(state): State<Arc<AppState>>) -> Json<Vec<ClientSummaryDto>> {
    let clients = state.list_clients_usecase.execute().await;

    // Domain Model から DTO への変換
    let summaries = clients
        .into_iter()
        .map(|(client_id, connected_at)| ClientSummaryDto {
            client_id: client_id.into_string(),
            connected_at: timestamp_to_jst_rfc3339(connected_at.value())
                .unwrap_or_else(|| connected_at.value().to_string()),
        })
        .collect();

    Json(summaries)
}

/// Debug endpoint to get the shared negotiation state
pub async fn debug_negotiation_state(
    State(state): State<Arc<AppState>>,
) -> Json<NegotiationStateDto> {
    Json(state.negotiation_engine.state().await.into())
}
