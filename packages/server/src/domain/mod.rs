//! Domain layer: value objects, entities, errors and the collaborator traits
//! the use cases depend on.

pub mod entity;
pub mod error;
pub mod media_engine;
pub mod registry;
pub mod value_object;

pub use entity::{
    ChatMessage, ClientConnection, NegotiationState, SdpType, SessionDescription,
    SignalingMessage,
};
pub use error::{DeliveryError, MediaEngineError, ValueObjectError};
pub use media_engine::MediaEngine;
pub use registry::{ConnectionRegistry, OutboundChannel};
pub use value_object::{ClientId, ClientIdFactory, Timestamp};
