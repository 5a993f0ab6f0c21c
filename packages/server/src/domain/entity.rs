//! Domain entities.

use std::fmt;

use super::{
    error::ValueObjectError,
    registry::OutboundChannel,
    value_object::{ClientId, Timestamp},
};

/// A chat message relayed between clients.
///
/// All three fields are opaque strings supplied by the sending client; the
/// relay neither interprets nor rewrites them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub message: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(sender: String, message: String, timestamp: String) -> Self {
        Self {
            sender,
            message,
            timestamp,
        }
    }
}

/// Role of a session description in the offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    Offer,
    Answer,
}

impl SdpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdpType::Offer => "offer",
            SdpType::Answer => "answer",
        }
    }
}

impl TryFrom<&str> for SdpType {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "offer" => Ok(SdpType::Offer),
            "answer" => Ok(SdpType::Answer),
            other => Err(ValueObjectError::UnsupportedSdpType(other.to_string())),
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed SDP blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// A signaling request received from a client.
pub type SignalingMessage = SessionDescription;

/// The process-wide negotiation record.
///
/// There is exactly one instance, shared by every client, because the relay
/// drives a single media-engine peer connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiationState {
    pub local_description: Option<SessionDescription>,
    pub remote_description: Option<SessionDescription>,
}

/// A registered client connection.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    pub id: ClientId,
    /// Outbound channel drained by the connection's pusher task
    pub sender: OutboundChannel,
    pub connected_at: Timestamp,
}

impl ClientConnection {
    pub fn new(id: ClientId, sender: OutboundChannel, connected_at: Timestamp) -> Self {
        Self {
            id,
            sender,
            connected_at,
        }
    }
}
