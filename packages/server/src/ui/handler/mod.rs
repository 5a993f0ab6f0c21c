//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{debug_negotiation_state, get_clients, health_check};
pub use websocket::websocket_handler;
