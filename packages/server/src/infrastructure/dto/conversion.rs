//! Conversion logic between DTOs and domain entities.

use crate::domain::{ChatMessage, SessionDescription};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::ChatMessageDto> for ChatMessage {
    fn from(dto: dto::ChatMessageDto) -> Self {
        Self::new(dto.sender, dto.message, dto.timestamp)
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for dto::ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            sender: model.sender,
            message: model.message,
            timestamp: model.timestamp,
        }
    }
}

impl From<SessionDescription> for dto::SessionDescriptionDto {
    fn from(model: SessionDescription) -> Self {
        Self {
            r#type: model.sdp_type.as_str().to_string(),
            sdp: model.sdp,
        }
    }
}
