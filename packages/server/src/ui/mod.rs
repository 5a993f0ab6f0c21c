//! WebSocket signaling relay server.

mod config;
mod handler;
mod server;
mod signal;
pub mod state;

pub use config::RelayConfig;
pub use server::Server;
