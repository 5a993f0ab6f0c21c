//! Domain error types.

use thiserror::Error;

use super::value_object::ClientId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("unsupported SDP type: {0}")]
    UnsupportedSdpType(String),
}

/// Writing to one recipient's outbound channel failed.
///
/// Only the recipient is affected; other deliveries carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbound channel of client '{0}' is closed")]
    ChannelClosed(ClientId),
}

/// The media engine refused a description or failed to produce one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaEngineError {
    #[error("invalid session description: {0}")]
    InvalidDescription(String),
    #[error("invalid signaling state: {0}")]
    InvalidState(String),
    #[error("media engine failure: {0}")]
    Engine(String),
}
