//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket envelope DTOs and the frame codec
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
