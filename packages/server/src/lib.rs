//! Kakehashi signaling relay library.
//!
//! Accepts WebSocket clients, broadcasts chat messages between them and drives
//! a single shared WebRTC offer/answer negotiation.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
