//! HTTP API response DTOs.

use serde::Serialize;

use crate::domain::NegotiationState;
use crate::infrastructure::dto::websocket::SessionDescriptionDto;

/// Connected client entry for `GET /api/clients`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummaryDto {
    pub client_id: String,
    /// RFC 3339 in JST
    pub connected_at: String,
}

/// Negotiation state for `GET /debug/negotiation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NegotiationStateDto {
    pub local_description: Option<SessionDescriptionDto>,
    pub remote_description: Option<SessionDescriptionDto>,
}

impl From<NegotiationState> for NegotiationStateDto {
    fn from(state: NegotiationState) -> Self {
        Self {
            local_description: state.local_description.map(Into::into),
            remote_description: state.remote_description.map(Into::into),
        }
    }
}
