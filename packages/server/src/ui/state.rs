//! Server state shared by the handlers.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::usecase::{
    BroadcastChatUseCase, ConnectClientUseCase, DisconnectClientUseCase, ListClientsUseCase,
    NegotiationEngine,
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（クライアント接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（クライアント切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// BroadcastChatUseCase（チャット配信のユースケース）
    pub broadcast_chat_usecase: Arc<BroadcastChatUseCase>,
    /// ListClientsUseCase（接続一覧取得のユースケース）
    pub list_clients_usecase: Arc<ListClientsUseCase>,
    /// プロセス全体で共有されるネゴシエーションエンジン
    pub negotiation_engine: Arc<NegotiationEngine>,
    /// Close idle connections after this long (`None` disables)
    pub idle_timeout: Option<Duration>,
    /// Flips to `true` once the process starts shutting down
    pub shutdown: watch::Receiver<bool>,
}
