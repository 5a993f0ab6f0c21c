//! Relay runtime configuration.

use std::time::Duration;

use crate::infrastructure::media_engine::DEFAULT_ICE_SERVER;

/// Default idle read timeout for a connection
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Runtime knobs of the relay, filled from the CLI by the binary.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to bind to
    pub port: u16,
    /// Close a connection after this long without an inbound frame
    /// (`None` waits forever)
    pub idle_timeout: Option<Duration>,
    /// Do not echo chat messages back to their sender
    pub exclude_sender: bool,
    /// STUN/TURN urls for the media engine
    pub ice_servers: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            exclude_sender: true,
            ice_servers: vec![DEFAULT_ICE_SERVER.to_string()],
        }
    }
}
