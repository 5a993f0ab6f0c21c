//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    BroadcastChatUseCase, ConnectClientUseCase, DisconnectClientUseCase, ListClientsUseCase,
    NegotiationEngine,
};

use super::{
    handler::{debug_negotiation_state, get_clients, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket signaling relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_client_usecase,
///     disconnect_client_usecase,
///     broadcast_chat_usecase,
///     list_clients_usecase,
///     negotiation_engine,
///     Some(Duration::from_secs(300)),
/// );
/// server.run("127.0.0.1".to_string(), 8000).await?;
/// ```
pub struct Server {
    connect_client_usecase: Arc<ConnectClientUseCase>,
    disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    broadcast_chat_usecase: Arc<BroadcastChatUseCase>,
    list_clients_usecase: Arc<ListClientsUseCase>,
    negotiation_engine: Arc<NegotiationEngine>,
    idle_timeout: Option<Duration>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `connect_client_usecase` - UseCase for client connection
    /// * `disconnect_client_usecase` - UseCase for client disconnection
    /// * `broadcast_chat_usecase` - UseCase for chat fan-out
    /// * `list_clients_usecase` - UseCase for listing connected clients
    /// * `negotiation_engine` - Shared SDP negotiation engine
    /// * `idle_timeout` - Idle read timeout per connection (`None` disables)
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        broadcast_chat_usecase: Arc<BroadcastChatUseCase>,
        list_clients_usecase: Arc<ListClientsUseCase>,
        negotiation_engine: Arc<NegotiationEngine>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            connect_client_usecase,
            disconnect_client_usecase,
            broadcast_chat_usecase,
            list_clients_usecase,
            negotiation_engine,
            idle_timeout,
        }
    }

    /// Run the relay until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Signaling relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// When `shutdown` resolves every connection loop is told to stop.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let app_state = Arc::new(AppState {
            connect_client_usecase: self.connect_client_usecase,
            disconnect_client_usecase: self.disconnect_client_usecase,
            broadcast_chat_usecase: self.broadcast_chat_usecase,
            list_clients_usecase: self.list_clients_usecase,
            negotiation_engine: self.negotiation_engine,
            idle_timeout: self.idle_timeout,
            shutdown: shutdown_rx,
        });

        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/clients", get(get_clients))
            .route("/debug/negotiation", get(debug_negotiation_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                // Receivers may all be gone already
                let _ = shutdown_tx.send(true);
            })
            .await
    }
}
