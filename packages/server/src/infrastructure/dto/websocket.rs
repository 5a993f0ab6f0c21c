//! WebSocket wire format and frame codec.
//!
//! Every inbound frame is an envelope `{"type": <kind>, "payload": {...}}`
//! where kind `0` is chat and `1` is signaling. Outbound chat frames are the
//! bare chat object, outbound answers are wrapped in a signaling envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{ChatMessage, SdpType, SessionDescription, SignalingMessage};

/// Envelope kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Chat,
    Signal,
}

impl MessageType {
    pub const fn code(self) -> i64 {
        match self {
            MessageType::Chat => 0,
            MessageType::Signal => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MessageType::Chat),
            1 => Some(MessageType::Signal),
            _ => None,
        }
    }
}

/// A decoded inbound frame.
///
/// The payload is kept untyped here and validated by the component that
/// consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Chat(Value),
    Signal(Value),
    /// Kind not understood by this server; dispatch ignores it
    Unknown(i64),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("missing envelope field '{0}'")]
    MissingField(&'static str),
    #[error("envelope type must be an integer, got {0}")]
    InvalidType(Value),
}

#[derive(Debug, Error)]
#[error("failed to encode frame: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

#[derive(Debug, Error)]
#[error("invalid chat payload: {0}")]
pub struct ChatPayloadError(#[from] serde_json::Error);

#[derive(Debug, Error)]
pub enum SignalPayloadError {
    #[error("invalid signaling payload: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("unsupported SDP type: {0}")]
    UnsupportedRole(String),
}

/// Chat payload, also the outbound chat frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub sender: String,
    pub message: String,
    pub timestamp: String,
}

/// Signaling payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptionDto {
    pub r#type: String,
    pub sdp: String,
}

/// Outbound signaling envelope
#[derive(Debug, Serialize)]
pub struct SignalEnvelopeDto {
    pub r#type: i64,
    pub payload: SessionDescriptionDto,
}

/// Decode one text frame into an [`Envelope`].
pub fn decode_frame(frame: &str) -> Result<Envelope, DecodeError> {
    let Value::Object(mut fields) = serde_json::from_str::<Value>(frame)? else {
        return Err(DecodeError::NotAnObject);
    };

    let kind = match fields.remove("type") {
        None | Some(Value::Null) => return Err(DecodeError::MissingField("type")),
        Some(value) => value.as_i64().ok_or(DecodeError::InvalidType(value))?,
    };
    let payload = match fields.remove("payload") {
        None | Some(Value::Null) => return Err(DecodeError::MissingField("payload")),
        Some(payload) => payload,
    };

    Ok(match MessageType::from_code(kind) {
        Some(MessageType::Chat) => Envelope::Chat(payload),
        Some(MessageType::Signal) => Envelope::Signal(payload),
        None => Envelope::Unknown(kind),
    })
}

/// Validate a chat payload: `sender`, `message` and `timestamp` must all be strings.
pub fn parse_chat_payload(payload: &Value) -> Result<ChatMessage, ChatPayloadError> {
    let dto = ChatMessageDto::deserialize(payload)?;
    Ok(dto.into())
}

/// Validate a signaling payload and resolve its role.
pub fn parse_signal_payload(payload: &Value) -> Result<SignalingMessage, SignalPayloadError> {
    let dto = SessionDescriptionDto::deserialize(payload)?;
    let sdp_type = SdpType::try_from(dto.r#type.as_str())
        .map_err(|_| SignalPayloadError::UnsupportedRole(dto.r#type.clone()))?;
    Ok(SessionDescription {
        sdp_type,
        sdp: dto.sdp,
    })
}

/// Serialize a chat message as an outbound frame.
pub fn encode_chat(message: &ChatMessage) -> Result<String, EncodeError> {
    let dto = ChatMessageDto::from(message.clone());
    Ok(serde_json::to_string(&dto)?)
}

/// Serialize a session description as an outbound signaling envelope.
pub fn encode_signal(description: &SessionDescription) -> Result<String, EncodeError> {
    let envelope = SignalEnvelopeDto {
        r#type: MessageType::Signal.code(),
        payload: description.clone().into(),
    };
    Ok(serde_json::to_string(&envelope)?)
}
