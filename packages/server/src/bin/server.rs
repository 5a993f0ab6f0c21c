//! Kakehashi signaling relay.
//!
//! Broadcasts chat messages between WebSocket clients and answers WebRTC
//! offers with a single shared peer connection.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kakehashi-server
//! cargo run --bin kakehashi-server -- --host 0.0.0.0 --port 3000 --idle-timeout-secs 0
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;

use kakehashi_server::{
    infrastructure::{
        media_engine::{DEFAULT_ICE_SERVER, WebRtcMediaEngine},
        registry::InMemoryConnectionRegistry,
    },
    ui::{RelayConfig, Server},
    usecase::{
        BroadcastChatUseCase, ConnectClientUseCase, DisconnectClientUseCase, ListClientsUseCase,
        NegotiationEngine,
    },
};
use kakehashi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "kakehashi-server")]
#[command(about = "WebSocket signaling relay with chat broadcast and SDP negotiation", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8000")]
    port: u16,

    /// Close connections idle for this many seconds (0 disables)
    #[arg(long, default_value = "300")]
    idle_timeout_secs: u64,

    /// Also deliver chat messages back to their sender
    #[arg(long)]
    echo_to_sender: bool,

    /// STUN/TURN server url for the media engine (repeatable, defaults to a public STUN server)
    #[arg(long = "ice-server", conflicts_with = "no_ice_server")]
    ice_servers: Vec<String>,

    /// Run the media engine without any ICE server
    #[arg(long)]
    no_ice_server: bool,
}

impl Args {
    fn resolved_ice_servers(&self) -> Vec<String> {
        if self.no_ice_server {
            Vec::new()
        } else if self.ice_servers.is_empty() {
            vec![DEFAULT_ICE_SERVER.to_string()]
        } else {
            self.ice_servers.clone()
        }
    }
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        let ice_servers = args.resolved_ice_servers();
        Self {
            host: args.host,
            port: args.port,
            idle_timeout: (args.idle_timeout_secs > 0)
                .then(|| Duration::from_secs(args.idle_timeout_secs)),
            exclude_sender: !args.echo_to_sender,
            ice_servers,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = RelayConfig::from(Args::parse());

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Registry
    // 2. MediaEngine
    // 3. UseCases
    // 4. Server

    // 1. Create Registry (in-memory)
    let registry = Arc::new(InMemoryConnectionRegistry::new());

    // 2. Create MediaEngine (one peer connection shared by every client)
    let media_engine = Arc::new(WebRtcMediaEngine::new(&config.ice_servers).await?);

    // 3. Create UseCases
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        registry.clone(),
        Arc::new(SystemClock),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(registry.clone()));
    let broadcast_chat_usecase = Arc::new(BroadcastChatUseCase::new(
        registry.clone(),
        config.exclude_sender,
    ));
    let list_clients_usecase = Arc::new(ListClientsUseCase::new(registry.clone()));
    let negotiation_engine = Arc::new(NegotiationEngine::new(media_engine));

    // 4. Create and run the server
    let server = Server::new(
        connect_client_usecase,
        disconnect_client_usecase,
        broadcast_chat_usecase,
        list_clients_usecase,
        negotiation_engine,
        config.idle_timeout,
    );
    server.run(config.host, config.port).await
}
